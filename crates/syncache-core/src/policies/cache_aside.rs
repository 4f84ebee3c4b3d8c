//! Cache-aside (read-through) policy

use crate::error::{CoordinatorError, Result};
use crate::ports::{RecordCache, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use syncache_types::Record;
use tracing::{debug, warn};

/// Read path: check the cache, fall back to the store on miss, then refill
/// the cache with the default TTL.
///
/// Cache failures on this path never fail the caller's request; they
/// degrade to a store read. There is no coalescing of concurrent misses:
/// N simultaneous misses cause N store reads and N cache fills.
pub struct CacheAsidePolicy {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn RecordCache>,
    ttl: Duration,
}

impl CacheAsidePolicy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn RecordCache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    pub async fn read(&self, id: i64) -> Result<Record> {
        let key = Record::cache_key(id);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Record>(&bytes) {
                Ok(record) => {
                    debug!(id, key = %key, "cache hit");
                    return Ok(record);
                }
                Err(e) => {
                    warn!(id, key = %key, "undecodable cache entry, reading store: {}", e);
                }
            },
            Ok(None) => {
                debug!(id, key = %key, "cache miss");
            }
            Err(e) => {
                warn!(id, key = %key, "cache read failed, reading store: {}", e);
            }
        }

        let record = self
            .store
            .get(id)
            .await?
            .ok_or(CoordinatorError::NotFound(id))?;

        // Best-effort refill; a failure here leaves the next read to miss
        // again, nothing worse.
        match serde_json::to_vec(&record) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, bytes, self.ttl).await {
                    warn!(id, key = %key, "cache fill failed: {}", e);
                }
            }
            Err(e) => warn!(id, "failed to serialize record for cache fill: {}", e),
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeCache, FakeStore};
    use std::sync::atomic::Ordering;

    fn policy(store: Arc<FakeStore>, cache: Arc<FakeCache>) -> CacheAsidePolicy {
        CacheAsidePolicy::new(store, cache, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn miss_reads_store_and_fills_cache() {
        let store = Arc::new(FakeStore::with_row(1, "alpha"));
        let cache = Arc::new(FakeCache::default());
        let policy = policy(store.clone(), cache.clone());

        let record = policy.read(1).await.unwrap();
        assert_eq!(record.name, "alpha");
        assert!(cache.contains("info:1"));
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);

        // Second read is served from the cache.
        let again = policy.read(1).await.unwrap();
        assert_eq!(again, record);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_row_is_not_found() {
        let store = Arc::new(FakeStore::default());
        let cache = Arc::new(FakeCache::default());
        let policy = policy(store, cache.clone());

        let err = policy.read(9).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.contains("info:9"));
    }

    #[tokio::test]
    async fn cache_failure_degrades_to_store() {
        let store = Arc::new(FakeStore::with_row(1, "alpha"));
        let cache = Arc::new(FakeCache::default());
        cache.fail_gets.store(true, Ordering::SeqCst);
        cache.fail_sets.store(true, Ordering::SeqCst);

        let record = policy(store, cache).read(1).await.unwrap();
        assert_eq!(record.name, "alpha");
    }

    #[tokio::test]
    async fn corrupt_cache_entry_degrades_to_store() {
        let store = Arc::new(FakeStore::with_row(1, "alpha"));
        let cache = Arc::new(FakeCache::default());
        cache.put("info:1", b"not json".to_vec());

        let record = policy(store, cache.clone()).read(1).await.unwrap();
        assert_eq!(record.name, "alpha");
        // The refill replaced the corrupt entry.
        let bytes = cache.peek("info:1").unwrap();
        assert!(serde_json::from_slice::<Record>(&bytes).is_ok());
    }

    #[tokio::test]
    async fn repeated_reads_return_identical_payloads() {
        let store = Arc::new(FakeStore::with_row(1, "alpha"));
        let policy = policy(store, Arc::new(FakeCache::default()));

        let first = policy.read(1).await.unwrap();
        for _ in 0..5 {
            assert_eq!(policy.read(1).await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn two_hundred_concurrent_cold_reads_all_correct() {
        let store = Arc::new(FakeStore::with_row(1, "alpha"));
        let policy = Arc::new(policy(store, Arc::new(FakeCache::default())));

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let policy = policy.clone();
                tokio::spawn(async move { policy.read(1).await })
            })
            .collect();

        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            assert_eq!(record.id, 1);
            assert_eq!(record.name, "alpha");
        }
        // No single-flight guarantee: the store may have been read any
        // number of times, correctness is all that is asserted.
    }
}
