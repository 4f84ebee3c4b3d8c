//! In-memory key-value cache using DashMap (stands in for Redis)

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use syncache_core::ports::RecordCache;
use syncache_core::Result;

/// Near-immediate deadline used by `expire_now`, mirroring a 1ms PEXPIRE:
/// the entry is re-stamped rather than removed outright, so eviction of a
/// large value never happens inline on a write path.
const EXPIRE_NOW_TTL: Duration = Duration::from_millis(1);

/// In-memory cache with per-entry TTL. Every entry carries a deadline; no
/// entry is permanent. A background sweeper clears expired entries that
/// were never read again.
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };
        cache.start_sweeper();
        cache
    }

    fn start_sweeper(&self) {
        let data = self.data.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;

                let now = Instant::now();
                let expired: Vec<String> = data
                    .iter()
                    .filter(|entry| now > entry.expires_at)
                    .map(|entry| entry.key().clone())
                    .collect();

                for key in expired {
                    data.remove(&key);
                }
            }
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.data.get(key).and_then(|entry| {
            if Instant::now() > entry.expires_at {
                drop(entry);
                self.data.remove(key);
                return None;
            }
            Some(entry.value.clone())
        });
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.data.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn expire_now(&self, key: &str) -> Result<()> {
        if let Some(mut entry) = self.data.get_mut(key) {
            entry.expires_at = Instant::now() + EXPIRE_NOW_TTL;
        }
        Ok(())
    }
}
