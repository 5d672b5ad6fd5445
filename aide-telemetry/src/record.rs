//! The relational telemetry record (spec §4.3) and shadow-call comparison.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of event a telemetry row describes.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// One LLM call (production or shadow).
    LlmCall,
    /// A direct-edit primitive applied outside the classifier/LLM path.
    DirectEdit,
    /// An undo operation (replay-based state restoration).
    Undo,
    /// A tier escalation.
    Escalation,
}

/// One row of the relational telemetry table. Every field beyond
/// `ts`/`aide_id`/`event_type` is optional because not every event type
/// populates every column (a `direct_edit` row has no `tier`/`model`, for
/// instance).
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// ISO-8601 timestamp, assigned by the orchestrator.
    #[serde(default)]
    pub ts: String,
    /// Aide this record belongs to.
    pub aide_id: String,
    /// Acting user, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The kind of event this row records.
    pub event_type: EventType,
    /// Model tier (`L2`/`L3`/`L4`), for `llm_call` rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Provider model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Prompt template version, for cache/quality correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_ver: Option<String>,
    /// Time to first content chunk, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfc_ms: Option<u64>,
    /// Time to stream completion, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttc_ms: Option<u64>,
    /// Input tokens billed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Output tokens billed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Cache-read tokens billed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    /// Cache-write tokens billed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u64>,
    /// Total JSONL event lines the parser emitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_emitted: Option<u32>,
    /// Lines that the reducer applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_accepted: Option<u32>,
    /// Lines the reducer rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_rejected: Option<u32>,
    /// Whether this turn escalated tiers mid-stream.
    #[serde(default)]
    pub escalated: bool,
    /// Free-form reason for an escalation row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    /// Computed USD cost of this call, serialized as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<Decimal>,
    /// Latency of a direct-edit application, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_latency_ms: Option<u64>,
    /// Client-supplied or orchestrator-assigned message id for this turn.
    #[serde(default)]
    pub message_id: String,
    /// Error summary, if this call/turn failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rejection-code rollup for the turn this row summarizes. Purely
    /// additive telemetry (spec-supplemented); populated only on the
    /// turn-summary row, empty elsewhere.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub rejection_counts: HashMap<String, u32>,
}

impl TelemetryRecord {
    /// A minimal record with just the required fields set.
    pub fn new(aide_id: impl Into<String>, event_type: EventType) -> Self {
        Self {
            aide_id: aide_id.into(),
            event_type,
            ..Default::default()
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::LlmCall
    }
}

/// Offline comparison of a production call against a shadow call against an
/// alternate model. Never applied to state, never surfaced to the user —
/// purely an analysis aid (spec §9 "Shadow-call comparison summary").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowComparison {
    /// `shadow.cost_usd - primary.cost_usd`.
    pub cost_delta_usd: Decimal,
    /// `shadow total tokens - primary total tokens`.
    pub token_delta: i64,
    /// Whether the two calls produced a different number of accepted
    /// primitive events — a cheap signal that outputs diverged materially.
    pub diverged: bool,
}

/// Compare a primary call's record against a shadow call's record.
pub fn compare_shadow(primary: &TelemetryRecord, shadow: &TelemetryRecord) -> ShadowComparison {
    let total_tokens = |r: &TelemetryRecord| -> i64 {
        r.input_tokens.unwrap_or(0) as i64
            + r.output_tokens.unwrap_or(0) as i64
            + r.cache_read_tokens.unwrap_or(0) as i64
            + r.cache_write_tokens.unwrap_or(0) as i64
    };
    ShadowComparison {
        cost_delta_usd: shadow.cost_usd.unwrap_or(Decimal::ZERO) - primary.cost_usd.unwrap_or(Decimal::ZERO),
        token_delta: total_tokens(shadow) - total_tokens(primary),
        diverged: primary.lines_accepted.unwrap_or(0) != shadow.lines_accepted.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_shadow_flags_divergence_on_accepted_count() {
        let primary = TelemetryRecord {
            lines_accepted: Some(3),
            cost_usd: Some(Decimal::new(10, 2)),
            input_tokens: Some(100),
            ..TelemetryRecord::new("aide_1", EventType::LlmCall)
        };
        let shadow = TelemetryRecord {
            lines_accepted: Some(4),
            cost_usd: Some(Decimal::new(25, 2)),
            input_tokens: Some(100),
            ..TelemetryRecord::new("aide_1", EventType::LlmCall)
        };
        let cmp = compare_shadow(&primary, &shadow);
        assert!(cmp.diverged);
        assert_eq!(cmp.cost_delta_usd, Decimal::new(15, 2));
    }

    #[test]
    fn identical_calls_do_not_diverge() {
        let a = TelemetryRecord {
            lines_accepted: Some(2),
            ..TelemetryRecord::new("aide_1", EventType::LlmCall)
        };
        let b = a.clone();
        assert!(!compare_shadow(&a, &b).diverged);
    }
}
