//! Write-invalidate policy ("read-update, write-delete")

use crate::ports::{RecordCache, RecordStore};
use crate::Result;
use std::sync::Arc;
use syncache_types::Record;
use tracing::{debug, warn};

/// Write path: update the store row, then invalidate the cache key so the
/// next cache-aside read refetches the fresh row.
///
/// The invalidation is best effort; its failure is logged, never surfaced.
/// Known race: a concurrent read can repopulate the cache between the
/// store update and the invalidation, in which case a stale entry persists
/// until TTL expiry.
pub struct WriteInvalidatePolicy {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordCache>,
}

impl WriteInvalidatePolicy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn RecordCache>) -> Self {
        Self { store, cache }
    }

    pub async fn write(&self, id: i64, name: &str) -> Result<()> {
        self.store.update(id, name).await?;
        debug!(id, name, "store updated, invalidating cache");

        let key = Record::cache_key(id);
        if let Err(e) = self.cache.expire_now(&key).await {
            warn!(id, key = %key, "cache invalidation failed: {}", e);
        }
        Ok(())
    }
}
