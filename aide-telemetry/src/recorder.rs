//! Per-turn in-memory recorder, instantiated at turn start and flushed into
//! the background queue at turn end (spec §4.3).

use crate::queue::TelemetryQueue;
use crate::record::{EventType, TelemetryRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Accumulates telemetry for a single turn: the production call, any
/// shadow calls, and a rollup of rejection codes encountered along the way.
/// Dropped (not enqueued) without finishing is a no-op — telemetry is
/// strictly best-effort and never required for turn correctness.
pub struct TurnRecorder {
    aide_id: String,
    user_id: Option<String>,
    message_id: String,
    rejection_counts: HashMap<String, u32>,
    calls: Vec<TelemetryRecord>,
}

impl TurnRecorder {
    /// Start recording a new turn.
    pub fn start(aide_id: impl Into<String>, user_id: Option<String>, message_id: impl Into<String>) -> Self {
        Self {
            aide_id: aide_id.into(),
            user_id,
            message_id: message_id.into(),
            rejection_counts: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Record one LLM call (production or shadow) for this turn.
    pub fn record_call(&mut self, mut record: TelemetryRecord) {
        record.aide_id = self.aide_id.clone();
        record.user_id = self.user_id.clone();
        record.message_id = self.message_id.clone();
        self.calls.push(record);
    }

    /// Note one rejected event's code for the turn-level rollup.
    pub fn record_rejection(&mut self, code: &str) {
        *self.rejection_counts.entry(code.to_string()).or_insert(0) += 1;
    }

    /// Finish the turn: attach the rejection-code rollup to the first
    /// recorded call (conventionally the production call) and enqueue every
    /// row onto the bounded queue. Enqueue is non-blocking; this method
    /// never awaits and never fails.
    pub fn finish(mut self, queue: &Arc<TelemetryQueue>) {
        if let Some(first) = self.calls.first_mut() {
            first.rejection_counts = std::mem::take(&mut self.rejection_counts);
        } else if !self.rejection_counts.is_empty() {
            // No LLM call at all (e.g. a direct edit that only rejected),
            // still worth a summary row.
            let mut summary = TelemetryRecord::new(self.aide_id.clone(), EventType::DirectEdit);
            summary.user_id = self.user_id.clone();
            summary.message_id = self.message_id.clone();
            summary.rejection_counts = std::mem::take(&mut self.rejection_counts);
            self.calls.push(summary);
        }
        for record in self.calls {
            queue.enqueue(record);
        }
    }
}
