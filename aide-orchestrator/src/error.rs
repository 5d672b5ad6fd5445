//! Orchestrator-level errors (spec §7 error taxonomy).

use aide_persistence::PersistenceError;
use aide_provider::ProviderError;
use thiserror::Error;

/// Top-level turn errors. Validation errors are not represented here — a
/// rejected event is data (a `Rejection` on the reduce result), never a Rust
/// error (spec §7 "the reducer never propagates errors").
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A retried-once, still-failing transient condition (LLM read stall,
    /// transient store error).
    #[error("transient failure: {0}")]
    Transient(String),

    /// Persistence unavailable, or the per-aide lock could not be acquired
    /// within its timeout. The turn is aborted; the last persisted snapshot
    /// remains authoritative.
    #[error("fatal turn error: {0}")]
    Fatal(String),

    /// An invariant the reducer is supposed to guarantee broke at runtime.
    /// Logged with full context; in-memory state is discarded.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// A persistence-facade error propagated up as a fatal turn error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A provider error propagated up as a fatal turn error (after the
    /// retry policy in `pipeline::stream_and_reduce` gives up).
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The per-aide mutex could not be acquired before its timeout — a
    /// second concurrent turn was already in progress.
    #[error("aide busy: a turn is already in progress")]
    Busy,
}
