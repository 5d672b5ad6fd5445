//! The per-turn streaming pipeline: classification, cache-aware prompt
//! assembly, token streaming, line-buffered JSONL parsing, incremental
//! reduction, batch buffering, interrupt handling, and delta broadcast
//! (spec §4.2, §5).

#![deny(missing_docs)]

mod classifier;
mod config;
mod error;
mod frames;
mod mutex_registry;
mod parser;
mod pipeline;
mod prompt;

pub use classifier::{classify, Classification, Tier};
pub use config::{CacheConfig, ClassifierConfig, ModelConfig, OrchestratorConfig};
pub use error::OrchestratorError;
pub use frames::{ClientFrame, ServerFrame};
pub use mutex_registry::{AideLockGuard, AideLockRegistry};
pub use parser::{LineParser, ParsedLine};
pub use pipeline::{CancellationToken, Orchestrator};
pub use prompt::{assemble as assemble_prompt, summarize_assistant_turn};
