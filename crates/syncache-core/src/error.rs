//! Error types for the consistency coordinator

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Coordinator error taxonomy. A cache miss is not represented here: the
/// cache port returns `Ok(None)` for a miss, which is normal control flow.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("record not found: {0}")]
    NotFound(i64),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("channel error: {0}")]
    Channel(String),
}

impl CoordinatorError {
    /// True when the record simply does not exist, as opposed to a
    /// collaborator failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoordinatorError::NotFound(_))
    }
}

impl From<serde_json::Error> for CoordinatorError {
    fn from(e: serde_json::Error) -> Self {
        CoordinatorError::Serialization(e.to_string())
    }
}
