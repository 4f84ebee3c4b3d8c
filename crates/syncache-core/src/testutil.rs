//! In-memory collaborator fakes with failure injection, shared by the
//! policy and task tests.

use crate::error::{CoordinatorError, Result};
use crate::ports::{RecordCache, RecordStore, UpdateChannel};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use syncache_types::Record;

#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<HashMap<i64, Record>>,
    pub fail_reads: AtomicBool,
    pub fail_updates: AtomicBool,
    pub reads: AtomicUsize,
}

impl FakeStore {
    pub fn with_row(id: i64, name: &str) -> Self {
        let store = Self::default();
        store.insert(Record::provisional(id, name));
        store
    }

    pub fn insert(&self, record: Record) {
        self.rows.lock().unwrap().insert(record.id, record);
    }

    pub fn row(&self, id: i64) -> Option<Record> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn get(&self, id: i64) -> Result<Option<Record>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Store("injected read failure".into()));
        }
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: i64, name: &str) -> Result<Record> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Store("injected update failure".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let record = rows.get_mut(&id).ok_or(CoordinatorError::NotFound(id))?;
        record.name = name.to_string();
        record.update_time = Utc::now();
        Ok(record.clone())
    }
}

/// TTLs are ignored here; expiry-sensitive tests drive `expire_now` or the
/// delayed-deletion handle instead of waiting out a clock.
#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_gets: AtomicBool,
    pub fail_sets: AtomicBool,
    pub fail_expires: AtomicBool,
}

impl FakeCache {
    pub fn put(&self, key: &str, value: Vec<u8>) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn put_record(&self, record: &Record) {
        let bytes = serde_json::to_vec(record).unwrap();
        self.put(&Record::cache_key(record.id), bytes);
    }

    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl RecordCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Cache("injected get failure".into()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Cache("injected set failure".into()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn expire_now(&self, key: &str) -> Result<()> {
        if self.fail_expires.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Cache("injected expire failure".into()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeChannel {
    published: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub fail_publishes: AtomicBool,
}

impl FakeChannel {
    pub fn published(&self) -> Vec<(String, String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateChannel for FakeChannel {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<()> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Channel("injected publish failure".into()));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), key.to_string(), payload));
        Ok(())
    }
}
