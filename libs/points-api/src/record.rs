use std::collections::HashMap;

/// A single record fetched from the broker. Key and value are opaque
/// bytes — the loop never interprets them, only the handler does.
#[derive(Debug, Clone)]
pub struct ConsumedRecord {
    pub topic: String,
    pub partition: u32,
    /// Broker-assigned offset within the partition.
    pub offset: u64,
    /// Record key — may be absent.
    pub key: Option<Vec<u8>>,
    /// Record value — may be absent.
    pub value: Option<Vec<u8>>,
}

/// Identifies one partition of one topic. Commit cursors are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: u32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self { topic: topic.into(), partition }
    }
}

impl std::fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// Result of one batched fetch: records grouped per partition, each group
/// in offset order. Groups carry no ordering relative to each other.
pub type FetchBatch = HashMap<TopicPartition, Vec<ConsumedRecord>>;

/// Total number of records in a fetch result.
pub fn batch_len(batch: &FetchBatch) -> usize {
    batch.values().map(Vec::len).sum()
}
