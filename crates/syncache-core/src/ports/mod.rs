//! Collaborator ports
//!
//! One trait per external collaborator. Policies depend only on these
//! contracts, never on a concrete store/cache/broker.

pub mod cache;
pub mod channel;
pub mod store;

pub use cache::RecordCache;
pub use channel::UpdateChannel;
pub use store::RecordStore;
