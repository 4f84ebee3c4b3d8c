//! Relational store port

use crate::Result;
use async_trait::async_trait;
use syncache_types::Record;

/// Authoritative record storage keyed by numeric id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point read. `Ok(None)` when the row does not exist.
    async fn get(&self, id: i64) -> Result<Option<Record>>;

    /// Point update of the mutable fields, returning the post-update row
    /// (with the store-assigned `update_time`). Errs with
    /// [`CoordinatorError::NotFound`](crate::CoordinatorError::NotFound)
    /// when the row is absent. Adapters run update + read-back inside one
    /// store transaction so the returned row is the committed state.
    async fn update(&self, id: i64, name: &str) -> Result<Record>;
}
