//! Telemetry error types.
//!
//! Per spec §7, telemetry errors are swallowed (logged) and never affect
//! user-visible turn behavior — this enum exists for the uploader's own
//! retry/drop bookkeeping, not for propagation to the orchestrator.

use thiserror::Error;

/// Errors from the flight-recorder background pipeline.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured sink rejected a batch.
    #[error("sink write failed: {0}")]
    SinkWrite(String),

    /// The sink timed out.
    #[error("sink write timed out")]
    Timeout,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
