//! Persistence facade errors.

use thiserror::Error;

/// Errors from the hydration/persistence facade.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No aide exists under the given id.
    #[error("aide not found: {0}")]
    NotFound(String),

    /// A write (persist, publish, fork) failed at the backend.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The caller does not own the aide it tried to touch (spec §4.4
    /// "the facade must enforce that callers only touch aides they own").
    #[error("access denied: caller does not own aide {0}")]
    AccessDenied(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
