//! Double-write policy

use crate::ports::{RecordCache, RecordStore};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use syncache_types::Record;
use tracing::{debug, warn};

/// Write path: commit the store update, then write the fresh row straight
/// into the cache.
///
/// There is no atomicity spanning the two systems. This runs as a
/// two-step saga: the store commit happens first and stands on its own;
/// if the cache write then fails, a compensating invalidation expires the
/// key and the cache error is reported to the caller. Callers seeing that
/// error must treat the store update as already durable.
pub struct DoubleWritePolicy {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordCache>,
    ttl: Duration,
}

impl DoubleWritePolicy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn RecordCache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub async fn write(&self, id: i64, name: &str) -> Result<()> {
        let record = self.store.update(id, name).await?;
        debug!(id, name, "store committed, writing through to cache");

        let key = Record::cache_key(id);
        let bytes = serde_json::to_vec(&record)?;
        if let Err(e) = self.cache.set(&key, bytes, self.ttl).await {
            // Compensate: expire whatever the key currently holds so a
            // reader cannot keep serving a state older than the commit.
            if let Err(expire_err) = self.cache.expire_now(&key).await {
                warn!(id, key = %key, "compensating invalidation failed: {}", expire_err);
            }
            return Err(e);
        }
        Ok(())
    }
}
