//! HTTP transport error types.

use crate::Cause;
use std::sync::Arc;

/// Transport failure conditions after translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpErrorKind {
    /// The request exceeded its timeout
    #[display("Request timed out")]
    Timeout,
    /// The remote host could not be reached
    #[display("Network error occurred")]
    Network,
    /// Any other client-side transport failure
    #[display("HTTP client error: {}", _0)]
    Client(String),
}

/// HTTP error with source location and the original transport error.
#[derive(Debug, Clone, derive_more::Display)]
#[display("HTTP Error: {} at line {} in {}", kind, line, file)]
pub struct HttpError {
    /// The translated failure
    pub kind: HttpErrorKind,
    cause: Option<Cause>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use conduit_error::{HttpError, HttpErrorKind};
    ///
    /// let err = HttpError::new(HttpErrorKind::Client("connection reset".into()));
    /// assert!(err.to_string().contains("HTTP client error: connection reset"));
    /// ```
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            cause: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the original transport error.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HttpErrorKind {
        &self.kind
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        crate::cause::as_source(&self.cause)
    }
}
