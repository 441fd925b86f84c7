//! Pluggable LLM completion backend
//!
//! The reconciliation engine needs exactly one AI operation: prompt in,
//! text out. `CompletionBackend` defines that interface; `AiClient` is the
//! concrete enum wrapper providing Clone and compile-time dispatch.
//!
//! Configuration comes through the `AiSettings` service (env vars
//! `TUNA_AI_HOST`, `TUNA_AI_MODEL`, `TUNA_AI_API_KEY`,
//! `TUNA_AI_TIMEOUT_SECS`); without a configured host the engine simply
//! skips the semantic pass.

mod mock;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::settings::AiSettings;

/// One completion result, with token usage when the server reports it
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub tokens_in: Option<u32>,
    pub tokens_out: Option<u32>,
}

/// Trait defining the completion interface
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion call
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AiClient {
    /// Any server implementing the OpenAI `/v1/chat/completions` API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Deterministic backend for testing
    Mock(MockBackend),
}

impl AiClient {
    /// Build a client from the settings service; None when no host is
    /// configured
    pub fn from_settings(settings: &AiSettings) -> Option<Self> {
        let config = settings.current()?;
        Some(AiClient::OpenAICompatible(OpenAICompatibleBackend::new(
            &config,
        )))
    }

    /// Build a client straight from the environment, bypassing the TTL
    /// cache; None when no host is configured
    pub fn from_env() -> Option<Self> {
        Self::from_settings(&AiSettings::uncached())
    }

    /// Mock client answering with an empty mapping array
    pub fn mock() -> Self {
        AiClient::Mock(MockBackend::new())
    }

    /// Mock client answering with a fixed response
    pub fn mock_with_response(response: &str) -> Self {
        AiClient::Mock(MockBackend::with_response(response))
    }
}

#[async_trait]
impl CompletionBackend for AiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion> {
        match self {
            AiClient::OpenAICompatible(b) => b.complete(prompt, max_tokens).await,
            AiClient::Mock(b) => b.complete(prompt, max_tokens).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AiClient::OpenAICompatible(b) => b.health_check().await,
            AiClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AiClient::OpenAICompatible(b) => b.model(),
            AiClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AiClient::OpenAICompatible(b) => b.host(),
            AiClient::Mock(b) => b.host(),
        }
    }
}
