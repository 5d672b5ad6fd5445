//! A scripted provider for tests and local development, driven by a
//! `DELAY_PROFILE` (spec §6.4) rather than a real network call.

use crate::error::ProviderError;
use crate::provider::{ChunkStream, Provider};
use crate::types::{ProviderRequest, ProviderResponse, StreamChunk, TokenUsage};
use async_stream::stream;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

/// UX delay profile for the mock provider, matching spec §6.4's
/// `DELAY_PROFILE` configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayProfile {
    /// No delay between chunks; for fast unit/integration tests.
    Instant,
    /// A small per-chunk delay approximating an L2 (fast/cheap) call.
    RealisticL2,
    /// A larger per-chunk delay approximating an L3/L4 (reasoning) call.
    RealisticL3,
    /// An exaggerated delay for manually exercising interrupt handling.
    Slow,
}

impl DelayProfile {
    fn per_chunk_delay(self) -> Duration {
        match self {
            DelayProfile::Instant => Duration::ZERO,
            DelayProfile::RealisticL2 => Duration::from_millis(15),
            DelayProfile::RealisticL3 => Duration::from_millis(60),
            DelayProfile::Slow => Duration::from_millis(500),
        }
    }
}

/// A provider that replays a scripted queue of response texts instead of
/// calling a real model. Each `complete`/`stream` call pops the next
/// scripted text; calling past the end of the script is a test bug and
/// returns `ProviderError::InvalidResponse`.
pub struct MockProvider {
    script: Mutex<VecDeque<String>>,
    delay_profile: DelayProfile,
}

impl MockProvider {
    /// Construct a mock provider that will reply with each text in `script`,
    /// in order, one per call.
    pub fn new(script: Vec<String>, delay_profile: DelayProfile) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            delay_profile,
        }
    }

    async fn next_text(&self) -> Result<String, ProviderError> {
        self.script
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ProviderError::InvalidResponse("mock provider script exhausted".into()))
    }
}

impl Provider for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let text = self.next_text().await?;
        let input_tokens = request.messages.iter().map(|m| m.content.len() as u64 / 4).sum();
        Ok(ProviderResponse {
            id: format!("mock-{}", request.model),
            model: request.model,
            usage: TokenUsage {
                input_tokens,
                output_tokens: text.len() as u64 / 4,
                ..Default::default()
            },
            text,
        })
    }

    async fn stream(&self, _request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        let text = self.next_text().await?;
        let delay = self.delay_profile.per_chunk_delay();
        let output_tokens = text.len() as u64 / 4;

        let chunked = stream! {
            for line in text.split_inclusive('\n') {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(StreamChunk::Text(line.to_string()));
            }
            yield Ok(StreamChunk::Usage(TokenUsage {
                output_tokens,
                ..Default::default()
            }));
        };

        Ok(Box::pin(chunked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn complete_pops_scripted_text_in_order() {
        let provider = MockProvider::new(vec!["first".into(), "second".into()], DelayProfile::Instant);
        let request = ProviderRequest { model: "mock-model".into(), ..Default::default() };
        let r1 = provider.complete(request.clone()).await.unwrap();
        assert_eq!(r1.text, "first");
        let r2 = provider.complete(request).await.unwrap();
        assert_eq!(r2.text, "second");
    }

    #[tokio::test]
    async fn exhausted_script_returns_invalid_response() {
        let provider = MockProvider::new(vec![], DelayProfile::Instant);
        let result = provider.complete(ProviderRequest::default()).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn stream_yields_lines_then_usage() {
        let provider = MockProvider::new(vec!["line one\nline two\n".into()], DelayProfile::Instant);
        let mut chunks = provider.stream(ProviderRequest::default()).await.unwrap();

        let mut texts = Vec::new();
        let mut saw_usage = false;
        while let Some(chunk) = chunks.next().await {
            match chunk.unwrap() {
                StreamChunk::Text(t) => texts.push(t),
                StreamChunk::Usage(_) => saw_usage = true,
            }
        }
        assert_eq!(texts, vec!["line one\n", "line two\n"]);
        assert!(saw_usage);
    }
}
