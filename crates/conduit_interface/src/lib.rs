//! Provider-facing traits for the Conduit resilience layer.
//!
//! Model providers implement [`ModelDriver`] plus whichever capability
//! traits they support, and usually embed a [`ModelClient`] for the pooled
//! HTTP clients, retry policy and error translation they share.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod traits;

pub use client::ModelClient;
pub use traits::{Completion, Embeddings, ModelDriver};
