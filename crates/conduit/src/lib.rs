//! Conduit - resilience layer for LLM API clients
//!
//! Conduit wraps outbound model calls with the reliability concerns every
//! provider integration needs, without knowing anything about the providers
//! themselves.
//!
//! # Features
//!
//! - **Rate Limiting**: Sliding-window admission control per interval
//! - **Retry**: Bounded exponential backoff with jitter, filtered by failure class
//! - **Caching**: Time-bounded memoization keyed by a hash of the call's arguments
//! - **Pooled HTTP**: Reused blocking and async clients with error translation
//! - **Scoped Connections**: Connect/disconnect guaranteed around a block of work
//!
//! # Quick Start
//!
//! ```
//! use conduit::{CallArgs, ConduitError, RateLimiter, Resilience, RetryHandler, TtlCache};
//! use std::num::NonZeroU32;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ConduitError> {
//! let resilience = Resilience::new(RetryHandler::default())
//!     .with_cache(Arc::new(TtlCache::new(Duration::from_secs(300))))
//!     .with_limiter(Arc::new(RateLimiter::per_second(NonZeroU32::new(10).unwrap())));
//!
//! let args = CallArgs::new().arg("Hello!").kwarg("temperature", 0.7);
//! let reply = resilience
//!     .call(&args, || async { Ok::<_, ConduitError>("Hi there".to_string()) })
//!     .await?;
//!
//! assert_eq!(reply, "Hi there");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Conduit is organized as a workspace with focused crates:
//!
//! - `conduit_error` - Error taxonomy and failure classes
//! - `conduit_core` - Configuration and request/result types
//! - `conduit_rate_limit` - Rate limiter and retry handler
//! - `conduit_cache` - TTL cache and argument hashing
//! - `conduit_http` - Pooled HTTP clients
//! - `conduit_connection` - Scoped model connections
//! - `conduit_interface` - Provider traits and shared model client
//!
//! This crate (`conduit`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod resilience;
mod telemetry;

pub use resilience::Resilience;
pub use telemetry::{init_tracing, init_tracing_from_config};

// Re-export error types
pub use conduit_error::{
    Classified, ConduitError, ConduitErrorKind, ConduitResult, ConfigError, ConnectionError,
    ErrorClass, HttpError, HttpErrorKind, JsonError, UnexpectedError,
};

// Re-export configuration and data types
pub use conduit_core::{
    CompletionRequest, CompletionRequestBuilder, CompletionResult, ConduitConfig,
    EmbeddingRequest, EmbeddingResult, GlobalConfig, MergedModelConfig, ModelConfig,
};

// Re-export resilience components
pub use conduit_cache::{CacheEntry, CallArgs, DEFAULT_TTL, TtlCache, cache_key};
pub use conduit_connection::{
    ConnectionScope, ConnectionState, Connector, ModelConnection, ScopedConnection,
    SimulatedConnector, model_connection,
};
pub use conduit_http::{
    ClientConfig, ClientConfigBuilder, HttpClientManager, translate_transport_error,
};
pub use conduit_rate_limit::{RateLimiter, RetryHandler, RetryPolicy, RetryPolicyBuilder};

// Re-export provider interface
pub use conduit_interface::{Completion, Embeddings, ModelClient, ModelDriver};
