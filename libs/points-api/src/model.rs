use crate::error::PointsError;
use crate::event::{PointsEvent, ScoreResult};
use crate::history::HistoryRecord;

/// One computation's output: the scores to publish and the state that
/// replaces the stored history record for the event's history key.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub result: ScoreResult,
    pub history: HistoryRecord,
}

/// The opaque scoring computation.
///
/// CPU-bound and synchronous; the engine runs it on a bounded blocking
/// pool, never on the task driving the consume loop. `prior` is `None`
/// on cold start (no record stored for the history key yet).
///
/// Implementations must not mutate shared state outside their inputs and
/// outputs — the pool reuses workers across invocations.
pub trait ScoreModel: Send + Sync {
    fn score(
        &self,
        event: &PointsEvent,
        prior: Option<&HistoryRecord>,
    ) -> Result<ScoreOutcome, PointsError>;
}
