//! Configuration and core data types for the Conduit resilience layer.
//!
//! This crate is the collaborator that turns configuration files into the
//! plain values the resilience crates consume.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod types;

pub use config::{ConduitConfig, GlobalConfig, MergedModelConfig, ModelConfig};
pub use types::{
    CompletionRequest, CompletionRequestBuilder, CompletionResult, EmbeddingRequest,
    EmbeddingResult,
};
