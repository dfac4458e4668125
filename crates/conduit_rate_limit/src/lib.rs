//! Rate limiting and retry with exponential backoff.
//!
//! This crate holds the two throttling policies that wrap every remote call:
//! - [`RateLimiter`] bounds how many operations start within a trailing interval
//! - [`RetryHandler`] re-runs an operation on configured failure classes
//!
//! Both wrap any async operation without changing its output type. When
//! composed, the limiter goes inside the retry handler so only real network
//! attempts are throttled:
//!
//! ```rust,ignore
//! let result = retry
//!     .execute(|| limiter.execute(|| client.complete(&request)))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod limiter;
mod retry;

pub use limiter::RateLimiter;
pub use retry::{RetryHandler, RetryPolicy, RetryPolicyBuilder};
