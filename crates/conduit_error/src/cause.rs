//! Shared handle to an original error.

use std::sync::Arc;

/// Original error chained under a Conduit error.
///
/// Stored behind an `Arc` so error values stay `Clone`.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) fn as_source(cause: &Option<Cause>) -> Option<&(dyn std::error::Error + 'static)> {
    cause
        .as_deref()
        .map(|e| e as &(dyn std::error::Error + 'static))
}
