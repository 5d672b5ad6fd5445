//! Flight recorder: per-turn telemetry capture plus a bounded, non-blocking
//! background batch uploader.
//!
//! Nothing here ever affects turn correctness: enqueue is O(1) and
//! infallible, overflow drops the oldest record, and sink failures are
//! logged and swallowed (spec §4.3, §7).

#![deny(missing_docs)]

mod config;
mod cost;
mod error;
mod queue;
mod record;
mod recorder;
mod uploader;

pub use config::TelemetryConfig;
pub use cost::{cost, ModelPricing};
pub use error::TelemetryError;
pub use queue::TelemetryQueue;
pub use record::{compare_shadow, EventType, ShadowComparison, TelemetryRecord};
pub use recorder::TurnRecorder;
pub use uploader::{render_batch, TelemetrySink, Uploader};
