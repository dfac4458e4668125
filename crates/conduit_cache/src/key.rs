//! Deterministic cache keys for call arguments.

use conduit_error::{ConduitResult, JsonError};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Positional and keyword arguments of a call.
///
/// Keyword arguments are stored sorted, so the order they were supplied in
/// never changes the derived key.
///
/// # Examples
///
/// ```
/// use conduit_cache::{CallArgs, cache_key};
///
/// let a = CallArgs::new().arg("gpt-4o").kwarg("temperature", 0.2).kwarg("max_tokens", 64);
/// let b = CallArgs::new().arg("gpt-4o").kwarg("max_tokens", 64).kwarg("temperature", 0.2);
///
/// assert_eq!(cache_key(&a).unwrap(), cache_key(&b).unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallArgs {
    args: Vec<JsonValue>,
    kwargs: BTreeMap<String, JsonValue>,
}

impl CallArgs {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<JsonValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument, replacing any previous value under `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// Derive the cache key for a set of arguments.
///
/// The arguments are serialized to JSON with every object's keys sorted, then
/// hashed with SHA-256. The key is the lowercase hex digest.
///
/// # Errors
///
/// Returns a JSON error if the arguments cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn cache_key<A>(args: &A) -> ConduitResult<String>
where
    A: Serialize + ?Sized,
{
    let value = serde_json::to_value(args).map_err(|e| {
        JsonError::new(format!("Failed to serialize cache key arguments: {}", e))
    })?;
    let canonical = canonicalize(value).to_string();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Rebuild objects with sorted keys, whatever map ordering serde_json uses.
fn canonicalize(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, JsonValue> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            JsonValue::Object(sorted)
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
