use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use points_api::error::PointsError;
use points_api::event::ScoreResult;
use points_api::history::HistoryRecord;
use points_api::store::{HistoryStore, ResultSink};

/// In-memory history store — the default when no external store is
/// injected, and the store used by tests.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: std::sync::RwLock<HashMap<String, HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the record for a key, without going through the trait.
    pub fn get(&self, key: &str) -> Option<HistoryRecord> {
        self.read_guard().get(key).cloned()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, HistoryRecord>> {
        match self.records.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("history store read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, HistoryRecord>> {
        match self.records.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("history store write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn read(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<HistoryRecord>, PointsError>> + Send + '_>>
    {
        let record = self.read_guard().get(key).cloned();
        Box::pin(async move { Ok(record) })
    }

    fn write(
        &self,
        key: &str,
        record: HistoryRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            self.write_guard().insert(key, record);
            Ok(())
        })
    }
}

/// Fallback sink — warns and drops the result. Keeps the handler usable
/// before a real producer is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ResultSink for DiscardSink {
    fn publish<'a>(
        &'a self,
        result: ScoreResult,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::warn!(%key, ?result, "no result sink configured, result will be lost");
            Ok(())
        })
    }
}
