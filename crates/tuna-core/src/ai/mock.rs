//! Mock backend for testing
//!
//! Returns a fixed response for every completion call, so reconciliation
//! tests can exercise the semantic pass without a running LLM server.

use async_trait::async_trait;

use crate::error::Result;

use super::{Completion, CompletionBackend};

/// Mock completion backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Fixed response text; defaults to an empty mapping array
    pub response: String,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Mock that answers every prompt with an empty JSON array
    pub fn new() -> Self {
        Self {
            response: "[]".to_string(),
            healthy: true,
        }
    }

    /// Mock with a caller-provided response
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            healthy: true,
        }
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<Completion> {
        Ok(Completion {
            text: self.response.clone(),
            tokens_in: Some(0),
            tokens_out: Some(0),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
