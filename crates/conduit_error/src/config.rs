//! Configuration error types.

use crate::Cause;
use std::sync::Arc;

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    cause: Option<Cause>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use conduit_error::ConfigError;
    ///
    /// let err = ConfigError::new("Config file not found: conduit.toml");
    /// assert!(err.message.contains("not found"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            cause: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the error reported by the configuration source.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        crate::cause::as_source(&self.cause)
    }
}
