//! The streaming turn channel's wire frames (spec §6.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One frame sent by a client over the per-aide streaming channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A natural-language turn.
    Message {
        /// User-authored text.
        content: String,
        /// Client-chosen correlation id; generated server-side if absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    /// A direct field edit, bypassing classification and the LLM entirely.
    DirectEdit {
        /// Target entity id.
        entity_id: String,
        /// Field name within the entity's props.
        field: String,
        /// New value.
        value: Value,
    },
    /// Cancel the turn currently in progress.
    Interrupt,
    /// Switch the mock/test delay profile (spec §6.4 `DELAY_PROFILE`).
    SetProfile {
        /// One of `realistic_l2`, `realistic_l3`, `realistic_l4`, `instant`, `slow`.
        profile: String,
    },
}

/// One frame sent by the server over the per-aide streaming channel, in the
/// order listed in spec §6.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A turn has begun.
    #[serde(rename = "stream.start")]
    StreamStart {
        /// Correlation id for this turn.
        message_id: String,
    },
    /// The classifier's tier decision for this turn.
    Classification {
        /// `L2`, `L3`, or `L4`.
        tier: String,
        /// The resolved provider model identifier.
        model: String,
        /// Which rule matched, for debugging/telemetry.
        reason: String,
    },
    /// A free-form text fragment for display.
    Voice {
        /// Text to surface to the client.
        text: String,
    },
    /// Start of a batch window; individual deltas within are not broadcast
    /// until the matching `batch.end`.
    #[serde(rename = "batch.start")]
    BatchStart,
    /// End of a batch window.
    #[serde(rename = "batch.end")]
    BatchEnd,
    /// A new entity.
    #[serde(rename = "entity.create")]
    EntityCreate {
        /// New entity id.
        id: String,
        /// Entity data, as rendered for the client mirror.
        data: Value,
    },
    /// An updated entity.
    #[serde(rename = "entity.update")]
    EntityUpdate {
        /// Target entity id.
        id: String,
        /// Updated entity data.
        data: Value,
    },
    /// A removed entity.
    #[serde(rename = "entity.remove")]
    EntityRemove {
        /// Removed entity id.
        id: String,
    },
    /// An event was rejected by the reducer; state did not change.
    Rejection {
        /// The reducer's rejection code, as a string.
        code: String,
        /// Human-readable detail.
        reason: String,
    },
    /// The turn is complete.
    #[serde(rename = "stream.end")]
    StreamEnd {
        /// Correlation id for this turn.
        message_id: String,
        /// Set when the stream ended due to a transport or fatal error
        /// rather than normal completion (spec §4.2 failure table).
        #[serde(default, skip_serializing_if = "is_false")]
        error: bool,
    },
    /// The turn was cancelled by an `interrupt` frame.
    #[serde(rename = "stream.interrupted")]
    StreamInterrupted {
        /// Correlation id for this turn.
        message_id: String,
    },
    /// A `direct_edit` could not be applied; state did not change.
    #[serde(rename = "direct_edit.error")]
    DirectEditError {
        /// Human-readable detail.
        error: String,
    },
}

fn is_false(b: &bool) -> bool {
    !*b
}
