//! Request and result types exchanged with model providers.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

fn default_temperature() -> f32 {
    0.7
}

/// Text completion request.
///
/// Serializable so it can double as the argument list of a cached call.
///
/// # Examples
///
/// ```
/// use conduit_core::CompletionRequest;
///
/// let request = CompletionRequest::builder()
///     .prompt(vec!["Hello!".to_string()])
///     .model("gpt-4o")
///     .max_tokens(Some(64))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.temperature, 0.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct CompletionRequest {
    /// One or more prompts
    pub prompt: Vec<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    #[builder(default = "default_temperature()")]
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum number of tokens to generate
    #[builder(default)]
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Provider-specific keyword parameters
    #[builder(default)]
    #[serde(default)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl CompletionRequest {
    /// Creates a new request builder.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}

/// Embedding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Texts to embed
    pub input: Vec<String>,
    /// Model identifier
    pub model: String,
    /// Provider-specific keyword parameters
    #[serde(default)]
    pub extra: BTreeMap<String, JsonValue>,
}

/// Result of a completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Generated text
    pub text: String,
    /// Model that produced the text
    pub model: String,
    /// Token usage counters (e.g. "prompt_tokens")
    pub usage: HashMap<String, u64>,
    /// Provider metadata
    pub metadata: HashMap<String, JsonValue>,
}

/// Result of an embedding call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    /// One vector per input
    pub embeddings: Vec<Vec<f32>>,
    /// Model that produced the vectors
    pub model: String,
    /// Token usage counters
    pub usage: HashMap<String, u64>,
}
