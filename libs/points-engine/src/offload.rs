use std::sync::Arc;
use std::time::Instant;

use points_api::error::PointsError;
use points_api::event::PointsEvent;
use points_api::history::HistoryRecord;
use points_api::model::{ScoreModel, ScoreOutcome};

/// Run the scoring model on the blocking pool.
///
/// The model call is CPU-bound and potentially long-running; it must
/// never execute on the task driving the consume loop, or a slow
/// computation would stall fetch/commit bookkeeping. Synchronous from
/// the caller's point of view — the handler suspends until the outcome
/// is ready. No timeout is enforced here: a stuck model stalls that
/// partition's commit progress until supervision intervenes.
pub async fn run_model(
    model: Arc<dyn ScoreModel>,
    event: PointsEvent,
    prior: Option<HistoryRecord>,
) -> Result<ScoreOutcome, PointsError> {
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || model.score(&event, prior.as_ref()))
        .await
        .map_err(|e| PointsError::compute(format!("scoring task did not complete: {e}")))??;
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model scoring finished"
    );
    Ok(outcome)
}
