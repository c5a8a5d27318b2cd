use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use points_api::broker::BrokerClient;
use points_api::handler::RecordHandler;
use points_api::record::batch_len;

use crate::config::ConsumerConfig;
use crate::error::ConsumerError;

/// The consume/commit loop — the unit to run in its own task (or its
/// own process, for horizontal fan-out; one loop instance per driver).
///
/// Repeatedly fetches a batch, drives each record through the handler
/// in offset order within its partition, and commits that record's
/// offset only after the handler returned Ok. A single cooperative task
/// touches the broker and the commit cursor, so no locking surrounds
/// offset commit. Any handler or transport failure terminates the loop;
/// external supervision restarts it, and the broker redelivers every
/// uncommitted record (at-least-once delivery).
pub struct ConsumeLoop {
    name: String,
    topics: Vec<String>,
    batch_size: usize,
    poll_timeout: Duration,
    broker: Arc<dyn BrokerClient>,
    handler: Arc<dyn RecordHandler>,
}

impl ConsumeLoop {
    pub fn new(
        config: &ConsumerConfig,
        broker: Arc<dyn BrokerClient>,
        handler: Arc<dyn RecordHandler>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            topics: config.topics.clone(),
            batch_size: config.batch_size,
            poll_timeout: config.poll_timeout(),
            broker,
            handler,
        }
    }

    /// Run until shutdown is signalled or a failure terminates the loop.
    ///
    /// Broker-side resources are released on every exit path — error,
    /// shutdown or cancellation — so the group can rebalance promptly.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ConsumerError> {
        tracing::info!(
            consumer = %self.name,
            topics = ?self.topics,
            "subscribing"
        );
        // A client can partially join the group before subscribe
        // errors, so a failed subscribe takes the leave() path too.
        let result = match self.broker.subscribe(&self.topics).await {
            Ok(()) => self.consume(&mut shutdown).await,
            Err(e) => Err(ConsumerError::from(e)
                .with_context(format!("consumer '{}' subscribe", self.name))),
        };
        if let Err(e) = &result {
            tracing::error!(consumer = %self.name, error = %e, "consume loop failed");
        }

        // Leave the group even on the error path.
        if let Err(e) = self.broker.leave().await {
            tracing::warn!(consumer = %self.name, error = %e, "failed to leave group cleanly");
        }
        result
    }

    async fn consume(&self, shutdown: &mut watch::Receiver<bool>) -> Result<(), ConsumerError> {
        loop {
            if *shutdown.borrow() {
                tracing::info!(consumer = %self.name, "shutdown requested, stopping");
                return Ok(());
            }

            let batch = tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() {
                        return Ok(());
                    }
                    continue;
                }
                fetched = self.broker.poll(self.poll_timeout, self.batch_size) => fetched?,
            };

            if batch_len(&batch) == 0 {
                // Idle: back off for one poll interval instead of spinning.
                tracing::debug!(consumer = %self.name, "no records received, sleeping");
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            return Ok(());
                        }
                    }
                    _ = tokio::time::sleep(self.poll_timeout) => {}
                }
                continue;
            }

            // Partitions in a batch carry no ordering relative to each
            // other; records within one partition are never reordered
            // or overlapped.
            for (tp, records) in batch {
                for record in records {
                    // Between records the batch is a safe stopping
                    // point: nothing is half-done, unhandled records
                    // are simply redelivered after the restart.
                    if *shutdown.borrow() {
                        tracing::info!(consumer = %self.name, "shutdown requested, stopping");
                        return Ok(());
                    }

                    tracing::info!(
                        consumer = %self.name,
                        topic = %tp.topic,
                        partition = tp.partition,
                        offset = record.offset,
                        "received record"
                    );

                    // Failure leaves the offset uncommitted; the error
                    // carries the record coordinates to the exit log.
                    self.handler
                        .handle(record.key.as_deref(), record.value.as_deref())
                        .await
                        .map_err(|e| {
                            e.with_context(format!(
                                "handler for {}[{}] offset {}",
                                tp.topic, tp.partition, record.offset
                            ))
                        })?;

                    // Commit only what was actually processed.
                    self.broker
                        .commit(&tp, record.offset + 1)
                        .await
                        .map_err(|e| {
                            e.with_context(format!(
                                "commit for {}[{}] next offset {}",
                                tp.topic,
                                tp.partition,
                                record.offset + 1
                            ))
                        })?;
                    tracing::debug!(
                        consumer = %self.name,
                        topic = %tp.topic,
                        partition = tp.partition,
                        next_offset = record.offset + 1,
                        "offset committed"
                    );
                }
            }
        }
    }
}
