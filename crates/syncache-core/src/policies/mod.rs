//! Consistency policies
//!
//! Five independent strategies over the same logical record, each with a
//! different consistency/latency/complexity trade-off:
//!
//! - [`CacheAsidePolicy`] — read-through with best-effort miss-fill
//! - [`WriteInvalidatePolicy`] — update the store, then invalidate
//! - [`DoubleWritePolicy`] — store commit then cache write, as a saga
//! - [`DelayedDoubleDeletePolicy`] — invalidate, update, invalidate again
//!   after a delay
//! - [`AsyncQueuePolicy`] — publish the update, apply it asynchronously
//!
//! Policies never call each other; an external trigger picks exactly one.

pub mod async_queue;
pub mod cache_aside;
pub mod delayed_double_delete;
pub mod double_write;
pub mod write_invalidate;

pub use async_queue::AsyncQueuePolicy;
pub use cache_aside::CacheAsidePolicy;
pub use delayed_double_delete::DelayedDoubleDeletePolicy;
pub use double_write::DoubleWritePolicy;
pub use write_invalidate::WriteInvalidatePolicy;
