//! Wire-shaped value types for the hydration/persistence facade (spec §4.4,
//! §6.2, §6.3). Plain serde-tagged structs, no transport or storage code.

use aide_core::{AideId, Event, Snapshot};
use serde::{Deserialize, Serialize};

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A human user.
    User,
    /// The aide itself (its voice response, or a mutation summary).
    Assistant,
}

/// One row of conversation history. Assistant mutation turns are expected
/// to already be summarized (`"[K operations applied]"`) by the orchestrator
/// before being handed to the facade — compaction is this crate's caller's
/// concern, not the store's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who sent this message.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// ISO-8601 timestamp.
    pub ts: String,
}

impl ConversationMessage {
    /// Construct a new conversation row.
    pub fn new(role: Role, content: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ts: ts.into(),
        }
    }
}

/// An aide's LLM-facing persona, assembled into the system prompt by the
/// orchestrator (spec §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blueprint {
    /// Short identity label (e.g. a name or role).
    pub identity: String,
    /// Voice/tone guidance.
    pub voice: String,
    /// Additional freeform prompt text.
    pub prompt: String,
}

/// The full cold-load response (spec §6.2). Clients must not replay events
/// to reconstruct state — `snapshot` is already materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrateResponse {
    /// The materialized current state.
    pub snapshot: Snapshot,
    /// The full append-only event log.
    pub events: Vec<Event>,
    /// The aide's blueprint.
    pub blueprint: Blueprint,
    /// Conversation history.
    pub messages: Vec<ConversationMessage>,
    /// 16-hex content hash of `snapshot`'s canonical JSON.
    pub snapshot_hash: String,
}

/// What a turn needs to begin: the materialized snapshot plus a short tail
/// of recent conversation (spec §4.2 step 1, `loadForTurn`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnLoad {
    /// The materialized current state.
    pub snapshot: Snapshot,
    /// The last N conversation rows (N is the caller's choice, typically
    /// 5..10 per spec §4.2).
    pub conversation_tail: Vec<ConversationMessage>,
    /// The aide's blueprint, needed to assemble the system prompt.
    pub blueprint: Blueprint,
}

/// Options controlling a `publish` call (spec §4.4 `publish(aide_id, slug,
/// rendered_bytes, options)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishOptions {
    /// MIME type of `rendered_bytes`, if known.
    pub content_type: Option<String>,
    /// Cache TTL, in seconds, for the published artifact.
    pub cache_ttl_seconds: Option<u64>,
}

/// Result of a successful `fork` (spec §4.4 "fork(aide_id) -> new_aide_id").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkResult {
    /// The newly created aide's id.
    pub new_aide_id: AideId,
    /// The sequence number the parent snapshot was at when forked
    /// (supplemented lineage bookkeeping, spec_full §9).
    pub forked_at_sequence: u64,
}
