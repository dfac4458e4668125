//! Error types for the Conduit resilience layer.
//!
//! Every transport-level failure is translated into one small taxonomy before
//! it reaches retry or cache logic, so callers only branch on [`ErrorClass`].
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//! - An optional cause keeps the original error reachable via
//!   [`std::error::Error::source`]
//!
//! # Examples
//!
//! ```
//! use conduit_error::{ConduitResult, ErrorClass, HttpError, HttpErrorKind};
//!
//! fn fetch_data() -> ConduitResult<String> {
//!     Err(HttpError::new(HttpErrorKind::Timeout))?
//! }
//!
//! let err = fetch_data().unwrap_err();
//! assert_eq!(err.class(), ErrorClass::Timeout);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cause;
mod class;
mod config;
mod connection;
mod error;
mod http;
mod json;
mod unexpected;

pub use cause::Cause;
pub use class::{Classified, ErrorClass};
pub use config::ConfigError;
pub use connection::ConnectionError;
pub use error::{ConduitError, ConduitErrorKind, ConduitResult};
pub use http::{HttpError, HttpErrorKind};
pub use json::JsonError;
pub use unexpected::UnexpectedError;
