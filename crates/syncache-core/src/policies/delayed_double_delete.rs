//! Delayed double-delete policy

use crate::ports::{RecordCache, RecordStore};
use crate::tasks::DelayedDeletion;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use syncache_types::Record;
use tracing::{debug, warn};

/// Write path: invalidate the cache key, update the store row, then
/// schedule a second invalidation of the same key after a fixed delay,
/// returning to the caller without waiting for it.
///
/// The second delete closes the window in which a concurrent read,
/// falling between the first delete and the store update, refills the
/// cache from a stale pre-update store read. The delay must exceed the
/// tail latency of such a read-miss-refill cycle. The scheduled delete is
/// fire-and-forget: if it is lost, the stale entry lives until TTL
/// expiry.
pub struct DelayedDoubleDeletePolicy {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordCache>,
    delay: Duration,
}

impl DelayedDoubleDeletePolicy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn RecordCache>, delay: Duration) -> Self {
        Self {
            store,
            cache,
            delay,
        }
    }

    /// Returns the handle of the scheduled second deletion. Production
    /// callers drop it (the timer stays armed); tests use it to advance
    /// logical time.
    pub async fn write(&self, id: i64, name: &str) -> Result<DelayedDeletion> {
        let key = Record::cache_key(id);

        if let Err(e) = self.cache.expire_now(&key).await {
            warn!(id, key = %key, "first cache invalidation failed: {}", e);
        }

        self.store.update(id, name).await?;
        debug!(id, name, delay_ms = self.delay.as_millis() as u64,
            "store updated, scheduling second invalidation");

        Ok(DelayedDeletion::schedule(
            self.cache.clone(),
            key,
            self.delay,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeCache, FakeStore};
    use std::sync::atomic::Ordering;

    const LONG: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn write_invalidates_updates_and_schedules() {
        let store = Arc::new(FakeStore::with_row(1, "old"));
        let cache = Arc::new(FakeCache::default());
        cache.put_record(&store.row(1).unwrap());

        let policy = DelayedDoubleDeletePolicy::new(store.clone(), cache.clone(), LONG);
        let deletion = policy.write(1, "Y").await.unwrap();

        assert_eq!(store.row(1).unwrap().name, "Y");
        assert!(!cache.contains("info:1"));
        deletion.cancel();
    }

    #[tokio::test]
    async fn stale_refill_between_deletes_is_cleared() {
        let store = Arc::new(FakeStore::with_row(1, "old"));
        let cache = Arc::new(FakeCache::default());

        let policy = DelayedDoubleDeletePolicy::new(store.clone(), cache.clone(), LONG);
        let deletion = policy.write(1, "Y").await.unwrap();

        // A concurrent reader raced the store update and refilled the
        // cache from the pre-update row.
        cache.put_record(&Record::provisional(1, "old"));
        assert!(cache.contains("info:1"));

        deletion.fire_now().await.unwrap();
        assert!(!cache.contains("info:1"));
    }

    #[tokio::test]
    async fn store_failure_propagates_and_schedules_nothing() {
        let store = Arc::new(FakeStore::with_row(1, "old"));
        let cache = Arc::new(FakeCache::default());
        store.fail_updates.store(true, Ordering::SeqCst);

        let policy = DelayedDoubleDeletePolicy::new(store, cache.clone(), LONG);
        assert!(policy.write(1, "Y").await.is_err());

        // Nothing pending: a later stale refill stays until its TTL.
        cache.put("info:1", b"refilled".to_vec());
        tokio::task::yield_now().await;
        assert!(cache.contains("info:1"));
    }

    #[tokio::test]
    async fn first_delete_failure_does_not_abort_the_write() {
        let store = Arc::new(FakeStore::with_row(1, "old"));
        let cache = Arc::new(FakeCache::default());
        cache.fail_expires.store(true, Ordering::SeqCst);

        let policy = DelayedDoubleDeletePolicy::new(store.clone(), cache.clone(), LONG);
        let deletion = policy.write(1, "Y").await.unwrap();
        assert_eq!(store.row(1).unwrap().name, "Y");

        // The scheduled deletion also fails, which is logged only.
        deletion.fire_now().await.unwrap();
    }
}
