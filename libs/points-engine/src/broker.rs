use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use points_api::broker::BrokerClient;
use points_api::error::PointsError;
use points_api::record::{ConsumedRecord, FetchBatch, TopicPartition};

#[derive(Debug, Clone)]
struct StoredRecord {
    key: Option<Vec<u8>>,
    value: Option<Vec<u8>>,
}

#[derive(Default)]
struct BrokerInner {
    /// topic → partition logs. An offset is the record's index in its log.
    topics: HashMap<String, Vec<Vec<StoredRecord>>>,
    /// Committed cursor (next offset to resume from) per partition.
    committed: HashMap<TopicPartition, u64>,
    /// Fetch position per partition, valid while subscribed.
    positions: HashMap<TopicPartition, u64>,
    subscriptions: Vec<String>,
    member: bool,
}

/// In-memory broker — backs tests and the offline replay path.
///
/// Subscribing resets fetch positions to the committed cursor, so a
/// subscribe after a failed run redelivers every uncommitted record,
/// the same recovery a real broker provides after a restart. Records
/// are local, so `poll` never waits: an empty result returns
/// immediately and the loop's idle sleep provides the pacing.
#[derive(Default)]
pub struct MemoryBroker {
    inner: std::sync::RwLock<BrokerInner>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::RwLockWriteGuard<'_, BrokerInner> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("memory broker lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Create a topic with the given partition count. Idempotent for an
    /// existing topic with the same partition count.
    pub fn create_topic(&self, name: impl Into<String>, partitions: u32) -> Result<(), PointsError> {
        let name = name.into();
        let mut inner = self.lock();
        if let Some(logs) = inner.topics.get(&name) {
            if logs.len() != partitions as usize {
                return Err(PointsError::transport(format!(
                    "topic '{name}' already exists with {} partitions",
                    logs.len()
                )));
            }
            return Ok(());
        }
        inner
            .topics
            .insert(name, (0..partitions).map(|_| Vec::new()).collect());
        Ok(())
    }

    /// Append a record to a partition. Returns the assigned offset.
    pub fn produce(
        &self,
        topic: &str,
        partition: u32,
        key: Option<Vec<u8>>,
        value: Option<Vec<u8>>,
    ) -> Result<u64, PointsError> {
        let mut inner = self.lock();
        let log = inner
            .topics
            .get_mut(topic)
            .ok_or_else(|| PointsError::transport(format!("unknown topic: '{topic}'")))?
            .get_mut(partition as usize)
            .ok_or_else(|| {
                PointsError::transport(format!("topic '{topic}' has no partition {partition}"))
            })?;
        log.push(StoredRecord { key, value });
        Ok(log.len() as u64 - 1)
    }

    /// Committed cursor for a partition, if any commit happened.
    pub fn committed(&self, tp: &TopicPartition) -> Option<u64> {
        self.lock().committed.get(tp).copied()
    }
}

impl BrokerClient for MemoryBroker {
    fn subscribe<'a>(
        &'a self,
        topics: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
        Box::pin(async move {
            let mut inner = self.lock();
            for topic in topics {
                if !inner.topics.contains_key(topic) {
                    return Err(PointsError::transport(format!("unknown topic: '{topic}'")));
                }
            }

            inner.subscriptions = topics.to_vec();
            inner.positions.clear();
            let mut positions = Vec::new();
            for topic in topics {
                let partitions = inner.topics[topic].len() as u32;
                for partition in 0..partitions {
                    let tp = TopicPartition::new(topic.clone(), partition);
                    let resume = inner.committed.get(&tp).copied().unwrap_or(0);
                    positions.push((tp, resume));
                }
            }
            inner.positions.extend(positions);
            inner.member = true;
            Ok(())
        })
    }

    fn poll(
        &self,
        _timeout: Duration,
        max_records: usize,
    ) -> Pin<Box<dyn Future<Output = Result<FetchBatch, PointsError>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.lock();
            if !inner.member {
                return Err(PointsError::transport("not a group member (poll)"));
            }

            let mut batch = FetchBatch::new();
            let mut budget = max_records;
            let subscriptions = inner.subscriptions.clone();
            for topic in &subscriptions {
                let partitions = inner.topics[topic].len() as u32;
                for partition in 0..partitions {
                    if budget == 0 {
                        break;
                    }
                    let tp = TopicPartition::new(topic.clone(), partition);
                    let position = inner.positions.get(&tp).copied().unwrap_or(0);
                    let log = &inner.topics[topic][partition as usize];

                    let available = log.len() as u64 - position.min(log.len() as u64);
                    let take = (available as usize).min(budget);
                    if take == 0 {
                        continue;
                    }

                    let records: Vec<ConsumedRecord> = (0..take as u64)
                        .map(|i| {
                            let offset = position + i;
                            let stored = &log[offset as usize];
                            ConsumedRecord {
                                topic: topic.clone(),
                                partition,
                                offset,
                                key: stored.key.clone(),
                                value: stored.value.clone(),
                            }
                        })
                        .collect();

                    budget -= take;
                    inner.positions.insert(tp.clone(), position + take as u64);
                    batch.insert(tp, records);
                }
            }
            Ok(batch)
        })
    }

    fn commit<'a>(
        &'a self,
        tp: &'a TopicPartition,
        next_offset: u64,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>> {
        Box::pin(async move {
            let mut inner = self.lock();
            if !inner.member {
                return Err(PointsError::transport("not a group member (commit)"));
            }
            if !inner.subscriptions.contains(&tp.topic) {
                return Err(PointsError::transport(format!(
                    "commit for unsubscribed topic: '{}'",
                    tp.topic
                )));
            }
            inner.committed.insert(tp.clone(), next_offset);
            Ok(())
        })
    }

    fn leave(&self) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.member = false;
            inner.subscriptions.clear();
            inner.positions.clear();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seeded_broker(topic: &str, count: usize) -> MemoryBroker {
        let broker = MemoryBroker::new();
        broker.create_topic(topic, 1).unwrap();
        for i in 0..count {
            broker
                .produce(
                    topic,
                    0,
                    Some(format!("key-{i}").into_bytes()),
                    Some(format!("value-{i}").into_bytes()),
                )
                .unwrap();
        }
        broker
    }

    #[tokio::test]
    async fn poll_returns_records_in_offset_order() {
        let broker = seeded_broker("t", 3);
        broker.subscribe(&topics(&["t"])).await.unwrap();

        let batch = broker.poll(Duration::from_millis(500), 100).await.unwrap();
        let records = &batch[&TopicPartition::new("t", 0)];
        let offsets: Vec<u64> = records.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn poll_respects_max_records() {
        let broker = seeded_broker("t", 5);
        broker.subscribe(&topics(&["t"])).await.unwrap();

        let first = broker.poll(Duration::from_millis(500), 2).await.unwrap();
        assert_eq!(points_api::record::batch_len(&first), 2);
        let second = broker.poll(Duration::from_millis(500), 100).await.unwrap();
        assert_eq!(points_api::record::batch_len(&second), 3);
        assert_eq!(second[&TopicPartition::new("t", 0)][0].offset, 2);
    }

    #[tokio::test]
    async fn resubscribe_resumes_from_committed_cursor() {
        let broker = seeded_broker("t", 4);
        let tp = TopicPartition::new("t", 0);

        broker.subscribe(&topics(&["t"])).await.unwrap();
        broker.poll(Duration::from_millis(500), 100).await.unwrap();
        broker.commit(&tp, 2).await.unwrap();
        broker.leave().await.unwrap();

        // Restart: uncommitted offsets 2 and 3 come back.
        broker.subscribe(&topics(&["t"])).await.unwrap();
        let batch = broker.poll(Duration::from_millis(500), 100).await.unwrap();
        let offsets: Vec<u64> = batch[&tp].iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![2, 3]);
    }

    #[tokio::test]
    async fn poll_outside_membership_is_transport_error() {
        let broker = seeded_broker("t", 1);
        let err = broker.poll(Duration::from_millis(500), 100).await.unwrap_err();
        assert_eq!(err.kind, points_api::error::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn subscribe_to_unknown_topic_fails() {
        let broker = MemoryBroker::new();
        let err = broker.subscribe(&topics(&["missing"])).await.unwrap_err();
        assert_eq!(err.kind, points_api::error::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn empty_partition_is_omitted_from_batch() {
        let broker = MemoryBroker::new();
        broker.create_topic("t", 2).unwrap();
        broker.produce("t", 0, None, Some(b"v".to_vec())).unwrap();
        broker.subscribe(&topics(&["t"])).await.unwrap();

        let batch = broker.poll(Duration::from_millis(500), 100).await.unwrap();
        assert!(batch.contains_key(&TopicPartition::new("t", 0)));
        assert!(!batch.contains_key(&TopicPartition::new("t", 1)));
    }
}
