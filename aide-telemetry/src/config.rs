//! Telemetry pipeline configuration (spec §6.4).

use std::time::Duration;

/// Tunables for the bounded background uploader.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryConfig {
    /// `TELEMETRY_QUEUE_SIZE`. Default 10,000.
    pub queue_size: usize,
    /// `TELEMETRY_BATCH_SIZE`. Default 100.
    pub batch_size: usize,
    /// `TELEMETRY_FLUSH_SECONDS`. Default 60.
    pub flush_interval: Duration,
    /// How long `shutdown` may block draining the queue before giving up.
    pub shutdown_deadline: Duration,
    /// Backoff before the single retry on a transient sink error.
    pub retry_backoff: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            queue_size: 10_000,
            batch_size: 100,
            flush_interval: Duration::from_secs(60),
            shutdown_deadline: Duration::from_secs(5),
            retry_backoff: Duration::from_secs(2),
        }
    }
}
