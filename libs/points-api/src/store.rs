use std::future::Future;
use std::pin::Pin;

use crate::error::PointsError;
use crate::event::ScoreResult;
use crate::history::HistoryRecord;

/// Keyed store of prior computation state.
///
/// `write` replaces the whole record for a key — all-or-nothing, never
/// field-by-field. Under this core's usage a key has a single writer at
/// a time (records within a partition are serialized), so a read must
/// observe the most recently persisted write for that key.
pub trait HistoryStore: Send + Sync {
    /// Read the current record for a history key. Absent is a valid
    /// cold-start state, not an error.
    fn read(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<HistoryRecord>, PointsError>> + Send + '_>>;

    /// Persist a record under a history key, overwriting any prior value.
    fn write(
        &self,
        key: &str,
        record: HistoryRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + '_>>;
}

/// Publish capability for computed score results, keyed by the decoded
/// record key. May be best-effort; must complete before the handler's
/// state update is persisted.
pub trait ResultSink: Send + Sync {
    fn publish<'a>(
        &'a self,
        result: ScoreResult,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>>;
}
