use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::PointsError;
use crate::record::{FetchBatch, TopicPartition};

/// Broker client capability the consume loop drives.
///
/// The loop doesn't know concrete broker implementations. An adapter over
/// a real client must run with auto-commit disabled — the loop owns
/// commit timing entirely — and `poll` must wait up to `timeout` for at
/// least one record before returning an empty batch.
pub trait BrokerClient: Send + Sync {
    /// Join the consumer group and subscribe to the given topics.
    /// Fetch positions resume from the last committed cursor.
    fn subscribe<'a>(
        &'a self,
        topics: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>>;

    /// Fetch up to `max_records` records across subscribed partitions,
    /// grouped per partition in offset order.
    fn poll(
        &self,
        timeout: Duration,
        max_records: usize,
    ) -> Pin<Box<dyn Future<Output = Result<FetchBatch, PointsError>> + Send + '_>>;

    /// Advance the committed cursor for one partition to `next_offset`
    /// (the offset the consumer resumes from after a restart).
    fn commit<'a>(
        &'a self,
        tp: &'a TopicPartition,
        next_offset: u64,
    ) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + 'a>>;

    /// Leave the group and release broker-side resources. Called on
    /// every loop exit path, error or not.
    fn leave(&self) -> Pin<Box<dyn Future<Output = Result<(), PointsError>> + Send + '_>>;
}
