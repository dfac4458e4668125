//! Trait definitions for model providers and their capabilities.

use async_trait::async_trait;
use conduit_core::{CompletionRequest, CompletionResult, EmbeddingRequest, EmbeddingResult};
use conduit_error::ConduitResult;
use conduit_http::HttpClientManager;

/// Core trait that every model provider implements.
pub trait ModelDriver: Send + Sync {
    /// Model identifier (e.g., "gpt-4o").
    fn model_name(&self) -> &str;

    /// Check that credentials and other prerequisites are in place.
    fn validate_environment(&self) -> ConduitResult<()>;

    /// Pooled HTTP clients used for provider calls.
    fn http(&self) -> &HttpClientManager;
}

/// Trait for models that generate text completions.
#[async_trait]
pub trait Completion: ModelDriver {
    /// Generate a completion for the request's prompts.
    async fn completion(&self, request: &CompletionRequest) -> ConduitResult<CompletionResult>;
}

/// Trait for models that can generate embeddings.
#[async_trait]
pub trait Embeddings: ModelDriver {
    /// Generate one embedding vector per input text.
    async fn embedding(&self, request: &EmbeddingRequest) -> ConduitResult<EmbeddingResult>;
}
