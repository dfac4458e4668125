//! Response caching with TTL support.
//!
//! This crate memoizes the results of async operations, keyed by a hash of
//! their arguments, for a bounded time window. Expired entries are removed
//! lazily when looked up; there is no background sweeper.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod key;

pub use cache::{CacheEntry, DEFAULT_TTL, TtlCache};
pub use key::{CallArgs, cache_key};
