//! Wire types for provider requests/responses and stream chunks.
//!
//! The model's wire payload (JSONL primitive lines plus free-text voice
//! fragments) is parsed by the orchestrator, not this crate — a `Provider`
//! only ever moves plain text and usage accounting.

use serde::{Deserialize, Serialize};

/// Who authored a message in a provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user.
    User,
    /// The assistant (prior turns, for context).
    Assistant,
}

/// How long a cacheable prompt block may live server-side (spec §4.2 step 3
/// "marked for ephemeral caching").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheTtl {
    /// Short-lived cache, for the shared prefix and tier-specific blocks.
    FiveMinutes,
    /// Longer-lived cache, for rarely-changing blocks.
    OneHour,
}

/// One block of the system prompt, with optional cache control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBlock {
    /// Block text.
    pub text: String,
    /// If set, this block is a cache breakpoint with the given TTL.
    pub cache: Option<CacheTtl>,
}

impl PromptBlock {
    /// An uncached block (e.g. the current snapshot JSON, which changes
    /// every turn and gains nothing from caching).
    pub fn uncached(text: impl Into<String>) -> Self {
        Self { text: text.into(), cache: None }
    }

    /// A block marked as a cache breakpoint.
    pub fn cached(text: impl Into<String>, ttl: CacheTtl) -> Self {
        Self { text: text.into(), cache: Some(ttl) }
    }
}

/// One message in the conversation tail sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who sent this message.
    pub role: Role,
    /// Message text (assistant mutation turns are pre-summarized by the
    /// caller, per spec §4.2 step 3).
    pub content: String,
    /// Whether this message is the cache breakpoint (the last tail message,
    /// per spec §4.2 step 3).
    pub cache_breakpoint: bool,
}

impl PromptMessage {
    /// Construct a message with no cache breakpoint.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), cache_breakpoint: false }
    }
}

/// A request to an LLM provider (spec §4.2 step 3-4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model identifier (a config-resolved value, not a tier name).
    pub model: String,
    /// System prompt blocks, in order: shared prefix, tier-specific, current
    /// snapshot JSON.
    pub system: Vec<PromptBlock>,
    /// Conversation tail plus the current user message.
    pub messages: Vec<PromptMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

/// Token usage and cost-relevant accounting for one call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the input/prompt.
    pub input_tokens: u64,
    /// Tokens in the output/completion.
    pub output_tokens: u64,
    /// Tokens read from cache.
    pub cache_read_tokens: u64,
    /// Tokens written to cache.
    pub cache_creation_tokens: u64,
}

/// A complete (non-streaming) provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider-assigned response id.
    pub id: String,
    /// The model that generated this response.
    pub model: String,
    /// The full generated text (JSONL primitive lines plus voice fragments,
    /// unparsed).
    pub text: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
}

/// One increment of a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamChunk {
    /// A chunk of raw generated text. The orchestrator's line buffer
    /// accumulates these and parses complete lines (spec §4.2 step 5).
    Text(String),
    /// Final usage accounting, emitted once near the end of the stream.
    Usage(TokenUsage),
}
