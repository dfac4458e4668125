//! TTL cache implementation.

use crate::cache_key;
use conduit_error::ConduitError;
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// TTL used by [`TtlCache::default`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cached value with its expiry instant.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Check if this entry is expired. An entry is still valid at its expiry instant.
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// Memoizes async results for a bounded time window.
///
/// Keys are usually produced by [`cache_key`] from a call's arguments. Every
/// read and write of the map happens under one mutex, so removing an expired
/// entry can never clobber a concurrent `set` of the same key.
///
/// Concurrent misses for the same key are not coalesced: each caller runs the
/// wrapped operation and the last one to finish wins the slot.
///
/// # Example
///
/// ```
/// use conduit_cache::{CallArgs, TtlCache};
/// use conduit_error::ConduitError;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ConduitError> {
/// let cache = TtlCache::new(Duration::from_secs(60));
/// let args = CallArgs::new().arg("What is Rust?");
///
/// let answer = cache
///     .get_or_compute(&args, || async { Ok::<_, ConduitError>("A language".to_string()) })
///     .await?;
///
/// // Second call is served from the cache
/// let cached = cache
///     .get_or_compute::<_, _, _, ConduitError>(&args, || async {
///         unreachable!("cache hit expected")
///     })
///     .await?;
/// assert_eq!(answer, cached);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    enabled: bool,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an enabled cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        debug!(ttl = ?ttl, "Creating new TtlCache");
        Self {
            ttl,
            enabled: true,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Enable or disable the cache. A disabled cache never stores and always misses.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the cache stores anything.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a cached value.
    ///
    /// Returns None if:
    /// - Entry doesn't exist
    /// - Entry is expired (it is removed now)
    /// - Cache is disabled
    #[instrument(skip(self), fields(ttl = ?self.ttl))]
    pub async fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;

        if entry.is_expired() {
            debug!("Cache entry expired, removing");
            entries.remove(key);
            return None;
        }

        debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
        Some(entry.value.clone())
    }

    /// Store a value with a fresh expiry, replacing any previous entry.
    #[instrument(skip(self, key, value), fields(ttl = ?self.ttl))]
    pub async fn set(&self, key: impl Into<String>, value: V) {
        if !self.enabled {
            debug!("Cache disabled, skipping insert");
            return;
        }

        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.lock().await;
        entries.insert(key.into(), entry);
        debug!(cache_size = entries.len(), "Inserted entry into cache");
    }

    /// Remove an entry, returning its value if it had not expired.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let entry = self.entries.lock().await.remove(key)?;
        (!entry.is_expired()).then_some(entry.value)
    }

    /// Remove expired entries from cache.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired());

        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, remaining = entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    /// Clear all cache entries.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        info!(cleared = count, "Cleared cache");
    }

    /// Number of stored entries, including expired ones not yet looked up.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Check if cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Return the cached result for `args`, or run `operation` and cache its success.
    ///
    /// The key is derived with [`cache_key`]. Failures are returned as-is and
    /// never cached. The cache lock is not held while `operation` runs.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a JSON error converted into `E` when
    /// the arguments cannot be serialized.
    pub async fn get_or_compute<A, F, Fut, E>(&self, args: &A, operation: F) -> Result<V, E>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: From<ConduitError>,
    {
        if !self.enabled {
            return operation().await;
        }

        let key = cache_key(args)?;

        if let Some(hit) = self.get(&key).await {
            return Ok(hit);
        }

        debug!(key = %key, "Cache miss, computing");
        let value = operation().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
