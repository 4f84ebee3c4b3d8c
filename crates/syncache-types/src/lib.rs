//! Syncache Types - Pure type definitions
//!
//! This crate contains only serde data types with no async runtime
//! dependencies, shared by the coordinator core and the server adapters.

pub mod envelope;
pub mod record;

pub use envelope::*;
pub use record::*;
