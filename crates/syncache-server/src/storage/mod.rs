//! Collaborator adapters: SQLite record store and in-memory TTL cache

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryCache;
