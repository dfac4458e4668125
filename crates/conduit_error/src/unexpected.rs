//! Catch-all error for failures outside the taxonomy.

use crate::Cause;
use std::sync::Arc;

/// Unexpected failure, wrapped with its original message.
#[derive(Debug, Clone, derive_more::Display)]
#[display("Unexpected error: {} at line {} in {}", message, line, file)]
pub struct UnexpectedError {
    /// Original message
    pub message: String,
    cause: Option<Cause>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl UnexpectedError {
    /// Create a new UnexpectedError at the current location.
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

    /// Wrap an arbitrary error, keeping it as the cause.
    #[track_caller]
    pub fn wrap(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        let mut err = Self::new(cause.to_string());
        err.cause = Some(Arc::new(cause));
        err
    }

    /// Wrap an already boxed error, keeping it as the cause.
    #[track_caller]
    pub fn from_boxed(cause: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        let mut err = Self::new(cause.to_string());
        err.cause = Some(Arc::from(cause));
        err
    }
}

impl std::error::Error for UnexpectedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        crate::cause::as_source(&self.cause)
    }
}
