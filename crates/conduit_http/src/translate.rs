//! Transport error translation.

use conduit_error::{ConduitError, HttpError, HttpErrorKind};
use tracing::debug;

/// Translate a transport failure into the error taxonomy.
///
/// Timeouts become [`HttpErrorKind::Timeout`], connection failures become
/// [`HttpErrorKind::Network`], everything else becomes
/// [`HttpErrorKind::Client`] with the transport's message. The original
/// error stays reachable through [`std::error::Error::source`].
#[track_caller]
pub fn translate_transport_error(err: reqwest::Error) -> ConduitError {
    let kind = if err.is_timeout() {
        HttpErrorKind::Timeout
    } else if err.is_connect() {
        HttpErrorKind::Network
    } else {
        HttpErrorKind::Client(err.to_string())
    };

    debug!(error = %err, translated = %kind, "Translated transport error");
    HttpError::new(kind).with_cause(err).into()
}
