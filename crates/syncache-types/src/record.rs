//! Record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the authoritative `info` table. The relational store is the
/// single source of truth; both timestamps are store-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Record {
    /// Cache key for a record id, e.g. `info:42`.
    pub fn cache_key(id: i64) -> String {
        format!("info:{}", id)
    }

    /// A record stamped at the current instant, used where a write path
    /// caches ahead of the store commit and the store-assigned timestamps
    /// are not yet known.
    pub fn provisional(id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            create_time: now,
            update_time: now,
        }
    }
}

/// The mutable fields of a record, carried by write requests and channel
/// messages. `id` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub id: i64,
    pub name: String,
}
