//! The `Provider` trait LLM backends implement.

use crate::error::ProviderError;
use crate::types::{ProviderRequest, ProviderResponse, StreamChunk};
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

/// A boxed stream of chunks from a streaming completion call. Errors may
/// appear mid-stream (a transport failure after some chunks have already
/// been yielded); the orchestrator stops reading on the first `Err` and
/// persists whatever was applied so far (spec §4.2 failure semantics).
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// LLM provider interface.
///
/// Uses RPITIT (return-position `impl Trait` in traits) and is intentionally
/// NOT object-safe — the orchestrator is generic over `P: Provider`, the
/// same shape as the reference workspace's turn-execution generic.
pub trait Provider: Send + Sync {
    /// Send a non-streaming completion request.
    fn complete(&self, request: ProviderRequest) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;

    /// Open a streaming completion call.
    fn stream(&self, request: ProviderRequest) -> impl Future<Output = Result<ChunkStream, ProviderError>> + Send;
}
