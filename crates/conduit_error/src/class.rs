//! Coarse failure classes used by retry policies.

use serde::{Deserialize, Serialize};

/// The unified failure taxonomy.
///
/// Retry policies hold a set of these and match every failure against it,
/// independent of which transport library produced the failure.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// Remote call exceeded the configured timeout
    Timeout,
    /// Transport-level connectivity failure
    Network,
    /// Any other transport failure
    HttpClient,
    /// The connect step of a connection scope failed
    ModelConnection,
    /// Configuration could not be loaded or parsed
    Config,
    /// Anything not matching the above
    Unexpected,
}

/// Errors that can report their [`ErrorClass`].
///
/// # Examples
///
/// ```
/// use conduit_error::{Classified, ConduitError, ErrorClass, UnexpectedError};
///
/// let err: ConduitError = UnexpectedError::new("boom").into();
/// assert_eq!(err.class(), ErrorClass::Unexpected);
/// ```
pub trait Classified {
    /// The failure class of this error.
    fn class(&self) -> ErrorClass;
}
