//! Asynchronous queue-driven policy (producer side)

use crate::ports::{RecordCache, UpdateChannel};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use syncache_types::{Record, RecordPatch, UpdateEnvelope};
use tracing::{debug, warn};

/// Write path: publish the update to the message channel keyed by the
/// record id (per-id ordering), then write a provisional copy into the
/// cache so readers get low-latency visibility ahead of the store commit.
///
/// Publish failure is a hard error: without the message on the channel
/// the store would never converge. The cache write after a successful
/// publish is best effort. The store update itself happens on the
/// consumer side, see [`UpdateApplier`](crate::consumer::UpdateApplier).
pub struct AsyncQueuePolicy {
    channel: Arc<dyn UpdateChannel>,
    cache: Arc<dyn RecordCache>,
    topic: String,
    ttl: Duration,
}

impl AsyncQueuePolicy {
    pub fn new(
        channel: Arc<dyn UpdateChannel>,
        cache: Arc<dyn RecordCache>,
        topic: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            channel,
            cache,
            topic: topic.into(),
            ttl,
        }
    }

    pub async fn write(&self, id: i64, name: &str) -> Result<()> {
        let envelope = UpdateEnvelope::new(RecordPatch {
            id,
            name: name.to_string(),
        });
        let payload = serde_json::to_vec(&envelope)?;

        self.channel
            .publish(&self.topic, &id.to_string(), payload)
            .await?;
        debug!(id, name, topic = %self.topic, "update published");

        // Provisional visibility: timestamps are stamped at publish time,
        // the store-assigned ones arrive with the next read-fill.
        let key = Record::cache_key(id);
        let provisional = Record::provisional(id, name);
        match serde_json::to_vec(&provisional) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, bytes, self.ttl).await {
                    warn!(id, key = %key, "provisional cache write failed: {}", e);
                }
            }
            Err(e) => warn!(id, "failed to serialize provisional record: {}", e),
        }
        Ok(())
    }
}
