//! Top-level error wrapper types.

use crate::{
    Classified, ConfigError, ConnectionError, ErrorClass, HttpError, HttpErrorKind, JsonError,
    UnexpectedError,
};

/// Every failure the resilience layer can surface.
///
/// # Examples
///
/// ```
/// use conduit_error::{ConduitError, HttpError, HttpErrorKind};
///
/// let err: ConduitError = HttpError::new(HttpErrorKind::Network).into();
/// assert!(format!("{}", err).contains("Network error occurred"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display)]
pub enum ConduitErrorKind {
    /// Transport failure, already translated
    #[from(HttpError)]
    Http(HttpError),
    /// Connection scope could not connect
    #[from(ConnectionError)]
    Connection(ConnectionError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Anything else
    #[from(UnexpectedError)]
    Unexpected(UnexpectedError),
}

impl ConduitErrorKind {
    fn inner(&self) -> &(dyn std::error::Error + 'static) {
        match self {
            ConduitErrorKind::Http(e) => e,
            ConduitErrorKind::Connection(e) => e,
            ConduitErrorKind::Config(e) => e,
            ConduitErrorKind::Json(e) => e,
            ConduitErrorKind::Unexpected(e) => e,
        }
    }
}

impl std::error::Error for ConduitErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner().source()
    }
}

impl Classified for ConduitErrorKind {
    fn class(&self) -> ErrorClass {
        match self {
            ConduitErrorKind::Http(e) => match e.kind() {
                HttpErrorKind::Timeout => ErrorClass::Timeout,
                HttpErrorKind::Network => ErrorClass::Network,
                HttpErrorKind::Client(_) => ErrorClass::HttpClient,
            },
            ConduitErrorKind::Connection(_) => ErrorClass::ModelConnection,
            ConduitErrorKind::Config(_) => ErrorClass::Config,
            ConduitErrorKind::Json(_) | ConduitErrorKind::Unexpected(_) => ErrorClass::Unexpected,
        }
    }
}

/// Conduit error with kind discrimination.
///
/// The original cause, when there is one, is reachable through
/// [`std::error::Error::source`].
///
/// # Examples
///
/// ```
/// use conduit_error::{ConduitError, ConduitResult, ConfigError};
///
/// fn might_fail() -> ConduitResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, derive_more::Display)]
#[display("Conduit Error: {}", _0)]
pub struct ConduitError(Box<ConduitErrorKind>);

impl ConduitError {
    /// Create a new error from a kind.
    pub fn new(kind: ConduitErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConduitErrorKind {
        &self.0
    }

    /// Get the failure class.
    pub fn class(&self) -> ErrorClass {
        self.0.class()
    }
}

impl std::error::Error for ConduitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl Classified for ConduitError {
    fn class(&self) -> ErrorClass {
        self.0.class()
    }
}

// Generic From implementation for any type that converts to ConduitErrorKind
impl<T> From<T> for ConduitError
where
    T: Into<ConduitErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Conduit operations.
pub type ConduitResult<T> = std::result::Result<T, ConduitError>;
