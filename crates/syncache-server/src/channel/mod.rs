//! In-process partitioned message channel
//!
//! A fixed set of ordered partitions over tokio mpsc queues. A message's
//! partition is `hash(key) % n`, so all messages for one record id land
//! on one partition and are consumed strictly in order; partitions are
//! consumed in parallel by one worker each. Per-partition committed
//! offsets record acknowledgment: a worker commits after a successful
//! apply and logs-and-skips on failure, matching at-least-once consumer
//! semantics without a dead-letter queue.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use syncache_core::consumer::UpdateApplier;
use syncache_core::error::CoordinatorError;
use syncache_core::ports::UpdateChannel;
use syncache_core::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One delivered message.
#[derive(Debug)]
pub struct Delivery {
    pub key: String,
    pub payload: Vec<u8>,
    pub partition: usize,
    pub offset: u64,
}

pub struct InProcessChannel {
    topic: String,
    senders: Vec<mpsc::UnboundedSender<Delivery>>,
    produced: Vec<AtomicU64>,
    committed: Arc<Vec<AtomicU64>>,
}

impl InProcessChannel {
    /// Create a channel with `partitions` ordered partitions, returning
    /// the receivers to hand to [`spawn_consumers`](Self::spawn_consumers).
    pub fn new(
        topic: impl Into<String>,
        partitions: usize,
    ) -> (Self, Vec<mpsc::UnboundedReceiver<Delivery>>) {
        assert!(partitions > 0, "channel needs at least one partition");

        let mut senders = Vec::with_capacity(partitions);
        let mut receivers = Vec::with_capacity(partitions);
        for _ in 0..partitions {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }

        let channel = Self {
            topic: topic.into(),
            senders,
            produced: (0..partitions).map(|_| AtomicU64::new(0)).collect(),
            committed: Arc::new((0..partitions).map(|_| AtomicU64::new(0)).collect()),
        };
        (channel, receivers)
    }

    /// Fixed partition-per-key assignment; per-key ordering depends on it.
    pub fn partition_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.senders.len() as u64) as usize
    }

    /// Number of acknowledged messages on a partition.
    pub fn committed(&self, partition: usize) -> u64 {
        self.committed[partition].load(Ordering::SeqCst)
    }

    /// Spawn one worker per partition. Each worker is strictly sequential
    /// within its partition: a message is applied to completion before the
    /// next is taken.
    pub fn spawn_consumers(
        &self,
        receivers: Vec<mpsc::UnboundedReceiver<Delivery>>,
        applier: Arc<UpdateApplier>,
    ) -> Vec<JoinHandle<()>> {
        receivers
            .into_iter()
            .enumerate()
            .map(|(partition, mut rx)| {
                let applier = applier.clone();
                let committed = self.committed.clone();
                tokio::spawn(async move {
                    while let Some(delivery) = rx.recv().await {
                        match applier.apply(&delivery.payload).await {
                            Ok(()) => {
                                committed[partition].store(delivery.offset + 1, Ordering::SeqCst);
                                debug!(
                                    partition,
                                    offset = delivery.offset,
                                    key = %delivery.key,
                                    "message applied and acknowledged"
                                );
                            }
                            Err(e) => {
                                // Terminal skip: no retry, no dead-letter.
                                warn!(
                                    partition,
                                    offset = delivery.offset,
                                    key = %delivery.key,
                                    "skipping message: {}",
                                    e
                                );
                            }
                        }
                    }
                    debug!(partition, "partition worker stopped");
                })
            })
            .collect()
    }
}

#[async_trait]
impl UpdateChannel for InProcessChannel {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<()> {
        if topic != self.topic {
            return Err(CoordinatorError::Channel(format!(
                "unknown topic: {}",
                topic
            )));
        }

        let partition = self.partition_for(key);
        let offset = self.produced[partition].fetch_add(1, Ordering::SeqCst);
        self.senders[partition]
            .send(Delivery {
                key: key.to_string(),
                payload,
                partition,
                offset,
            })
            .map_err(|_| CoordinatorError::Channel("all consumers stopped".into()))?;

        debug!(topic, key, partition, offset, "message published");
        Ok(())
    }
}
