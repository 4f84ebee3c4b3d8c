//! Key-value cache port

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with TTL semantics. Values are opaque bytes; the
/// policies store JSON-serialized records under `info:{id}` keys.
#[async_trait]
pub trait RecordCache: Send + Sync {
    /// `Ok(None)` is a miss, which is normal control flow, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Force near-immediate expiry of a key instead of an outright delete.
    /// A no-op when the key is absent.
    async fn expire_now(&self, key: &str) -> Result<()>;
}
