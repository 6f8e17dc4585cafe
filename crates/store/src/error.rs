//! Storage error types.

use thiserror::Error;

/// Errors that can occur when interacting with storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint would be violated by the staged changes.
    ///
    /// Commit re-validates every constraint under the store's write lock, so
    /// this also closes check-then-act races that handler-level scans cannot.
    #[error("unique constraint {constraint} violated by value {value}")]
    UniqueViolation {
        constraint: &'static str,
        value: String,
    },

    /// The session was already committed; a unit of work commits once.
    #[error("session already committed")]
    SessionClosed,
}

impl StoreError {
    /// Creates a unique-violation error.
    pub fn unique(constraint: &'static str, value: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint,
            value: value.into(),
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
