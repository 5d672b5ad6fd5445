//! LLM provider abstraction: the `Provider` trait, its wire types, and a
//! scripted mock implementation for tests (spec §4.2 steps 4-5, §6.4
//! `DELAY_PROFILE`).

#![deny(missing_docs)]

mod error;
mod mock;
mod provider;
mod types;

pub use error::ProviderError;
pub use mock::{DelayProfile, MockProvider};
pub use provider::{ChunkStream, Provider};
pub use types::{CacheTtl, ProviderRequest, ProviderResponse, PromptBlock, PromptMessage, Role, StreamChunk, TokenUsage};
