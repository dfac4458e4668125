//! Model connection errors.

use crate::Cause;
use std::sync::Arc;

/// Raised when the connect step of a connection scope fails.
#[derive(Debug, Clone, derive_more::Display)]
#[display("Model Connection Error: Failed to connect to model {} at line {} in {}", model_id, line, file)]
pub struct ConnectionError {
    /// Model whose connection failed
    pub model_id: String,
    cause: Option<Cause>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConnectionError {
    /// Create a new ConnectionError for `model_id` at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use conduit_error::ConnectionError;
    ///
    /// let err = ConnectionError::new("gpt-4o");
    /// assert!(err.to_string().contains("Failed to connect to model gpt-4o"));
    /// ```
    #[track_caller]
    pub fn new(model_id: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            model_id: model_id.into(),
            cause: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the error raised by the handshake.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        crate::cause::as_source(&self.cause)
    }
}
