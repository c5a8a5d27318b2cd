use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use points_api::error::PointsError;
use points_api::event::PointsEvent;
use points_api::handler::RecordHandler;
use points_api::model::ScoreModel;
use points_api::store::{HistoryStore, ResultSink};

use crate::offload;
use crate::store::{DiscardSink, InMemoryHistoryStore};

/// Per-key message handler: threads history state through the scoring
/// model and publishes the result.
///
/// One invocation runs strictly in order: decode → read history →
/// compute → publish result → persist history. The history write never
/// happens before the publish succeeded — a published-but-not-persisted
/// result is tolerable on redelivery, a persisted-but-not-published one
/// is not. Any failing step fails the invocation with nothing persisted.
pub struct PointsHandler {
    model: Arc<dyn ScoreModel>,
    sink: Arc<dyn ResultSink>,
    store: Arc<dyn HistoryStore>,
}

impl PointsHandler {
    /// Handler with default collaborators: in-memory history, discard sink.
    pub fn new(model: Arc<dyn ScoreModel>) -> Self {
        Self {
            model,
            sink: Arc::new(DiscardSink),
            store: Arc::new(InMemoryHistoryStore::new()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.store = store;
        self
    }

    async fn process(&self, key: Option<&[u8]>, value: Option<&[u8]>) -> Result<(), PointsError> {
        let value = value.ok_or_else(|| PointsError::decode("record has no value"))?;
        let event = PointsEvent::decode(value)?;

        let key = key.ok_or_else(|| PointsError::decode("record has no key"))?;
        let sink_key = std::str::from_utf8(key)
            .map_err(|e| PointsError::decode(format!("record key: {e}")))?
            .to_string();

        let history_key = event.history_key();
        let prior = self
            .store
            .read(&history_key)
            .await
            .map_err(|e| e.with_context(format!("history read '{history_key}'")))?;

        let outcome = offload::run_model(self.model.clone(), event, prior).await?;

        self.sink
            .publish(outcome.result, &sink_key)
            .await
            .map_err(|e| e.with_context(format!("result publish '{sink_key}'")))?;

        self.store
            .write(&history_key, outcome.history)
            .await
            .map_err(|e| e.with_context(format!("history write '{history_key}'")))?;

        Ok(())
    }
}

impl RecordHandler for PointsHandler {
    fn handle<'a>(
        &'a self,
        key: Option<&'a [u8]>,
        value: Option<&'a [u8]>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
        Box::pin(self.process(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use points_api::error::ErrorKind;
    use points_api::event::ScoreResult;
    use points_api::history::HistoryRecord;
    use points_api::model::ScoreOutcome;

    /// Appends the event label to the history and scores the number of
    /// computations seen so far for the key.
    struct AppendModel;

    impl ScoreModel for AppendModel {
        fn score(
            &self,
            event: &PointsEvent,
            prior: Option<&HistoryRecord>,
        ) -> Result<ScoreOutcome, PointsError> {
            let mut labels = prior.map(|h| h.labels.clone()).unwrap_or_default();
            labels.push(vec![event.label.clone()]);
            let mut result = ScoreResult::new();
            result.insert("score".to_string(), labels.len() as i64);
            Ok(ScoreOutcome {
                result,
                history: HistoryRecord {
                    labels,
                    accum_x: prior.map_or(1.0, |h| h.accum_x + 1.0),
                    accum_y: prior.map_or(2.0, |h| h.accum_y + 2.0),
                },
            })
        }
    }

    /// Records published (key, result) pairs in order.
    #[derive(Default)]
    struct RecordingSink {
        published: std::sync::Mutex<Vec<(String, ScoreResult)>>,
    }

    impl ResultSink for RecordingSink {
        fn publish<'a>(
            &'a self,
            result: ScoreResult,
            key: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
            Box::pin(async move {
                self.published.lock().unwrap().push((key.to_string(), result));
                Ok(())
            })
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn publish<'a>(
            &'a self,
            _result: ScoreResult,
            _key: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
            Box::pin(async { Err(PointsError::sink("producer unavailable")) })
        }
    }

    fn value(label: &str) -> Vec<u8> {
        format!(r#"{{"user_id":42,"ex_id":7,"label":"{label}"}}"#).into_bytes()
    }

    #[tokio::test]
    async fn cold_start_writes_first_record() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let handler = PointsHandler::new(Arc::new(AppendModel))
            .with_store(store.clone())
            .with_sink(sink.clone());

        handler
            .handle(Some(b"user-42"), Some(&value("A")))
            .await
            .unwrap();

        let record = store.get("42|7|A").unwrap();
        assert_eq!(record.labels, vec![vec!["A".to_string()]]);
        assert_eq!(record.accum_x, 1.0);

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "user-42");
        assert_eq!(published[0].1["score"], 1);
    }

    #[tokio::test]
    async fn second_message_observes_first_write() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let handler =
            PointsHandler::new(Arc::new(AppendModel)).with_store(store.clone());

        handler.handle(Some(b"k"), Some(&value("A"))).await.unwrap();
        handler.handle(Some(b"k"), Some(&value("A"))).await.unwrap();

        let record = store.get("42|7|A").unwrap();
        assert_eq!(record.labels.len(), 2);
        assert_eq!(record.accum_x, 2.0);
        assert_eq!(record.accum_y, 4.0);
    }

    #[tokio::test]
    async fn sink_failure_blocks_history_persistence() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let handler = PointsHandler::new(Arc::new(AppendModel))
            .with_store(store.clone())
            .with_sink(Arc::new(FailingSink));

        let err = handler
            .handle(Some(b"k"), Some(&value("A")))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Sink);
        // Persisted-without-published must never happen.
        assert!(store.get("42|7|A").is_none());
    }

    #[tokio::test]
    async fn malformed_value_is_decode_error() {
        let handler = PointsHandler::new(Arc::new(AppendModel));
        let err = handler
            .handle(Some(b"k"), Some(b"{\"user_id\":"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn absent_value_is_decode_error() {
        let handler = PointsHandler::new(Arc::new(AppendModel));
        let err = handler.handle(Some(b"k"), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn non_utf8_key_is_decode_error() {
        let handler = PointsHandler::new(Arc::new(AppendModel));
        let err = handler
            .handle(Some(&[0xff, 0xfe]), Some(&value("A")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn redelivery_of_same_message_is_tolerated() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let handler =
            PointsHandler::new(Arc::new(AppendModel)).with_store(store.clone());

        // Same message twice, as after an uncommitted-offset restart.
        handler.handle(Some(b"k"), Some(&value("A"))).await.unwrap();
        handler.handle(Some(b"k"), Some(&value("A"))).await.unwrap();

        // At-least-once: the state moved twice, nothing got stuck.
        assert_eq!(store.get("42|7|A").unwrap().labels.len(), 2);
    }
}
