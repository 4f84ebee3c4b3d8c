//! Syncache Core
//!
//! The consistency coordinator: five independent policies that keep a
//! key-value cache synchronized with an authoritative relational record,
//! each composing the same three collaborator ports (store, cache, update
//! channel) with a different consistency/latency trade-off.
//!
//! Collaborators are injected into every policy constructor as trait
//! objects; nothing in this crate touches a concrete database, cache, or
//! broker.

pub mod consumer;
pub mod error;
pub mod policies;
pub mod ports;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{CoordinatorError, Result};
pub use policies::{
    AsyncQueuePolicy, CacheAsidePolicy, DelayedDoubleDeletePolicy, DoubleWritePolicy,
    WriteInvalidatePolicy,
};

/// Default TTL for cache entries created by read-fill and write-through.
pub const DEFAULT_CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(300);
