//! Error types for the core data model.
//!
//! The reducer itself never returns a Rust `Err` (see [`crate::ReduceResult`]);
//! these types are for the surrounding operations that do real I/O-adjacent
//! work over the model, such as schema registration and canonical encoding.

use thiserror::Error;

/// Errors constructing or validating core model values outside of the
/// reducer's event-application path (e.g. building a snapshot from
/// untrusted wire data).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// An id failed the basic shape check (empty, or not snake_case-ish).
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Canonical encoding failed (should not happen for well-formed snapshots).
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
