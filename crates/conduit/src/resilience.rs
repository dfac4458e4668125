//! Composition of cache, retry and rate limiting around one call.

use conduit_cache::{DEFAULT_TTL, TtlCache};
use conduit_core::MergedModelConfig;
use conduit_error::{Classified, ConduitError};
use conduit_rate_limit::{RateLimiter, RetryHandler, RetryPolicy};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Cache, retry and rate limiting applied to outbound calls.
///
/// Layers nest as cache (outermost), then retry, then the rate limiter
/// (innermost). A cache hit therefore spends no retry budget and no rate
/// limit slot, while every retry attempt waits for its own slot.
///
/// Components are injected, so several pipelines can share one limiter or
/// one cache.
#[derive(Debug)]
pub struct Resilience<V> {
    cache: Option<Arc<TtlCache<V>>>,
    retry: RetryHandler,
    limiter: Option<Arc<RateLimiter>>,
}

impl<V> Clone for Resilience<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            retry: self.retry.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

impl<V: Clone> Resilience<V> {
    /// Pipeline with retry only.
    pub fn new(retry: RetryHandler) -> Self {
        Self {
            cache: None,
            retry,
            limiter: None,
        }
    }

    /// Pipeline for one model's resolved settings.
    ///
    /// The retry budget comes from `max_retries`. A cache with the default
    /// TTL is attached when `cache_enabled` is set.
    pub fn from_config(config: &MergedModelConfig, limiter: Option<Arc<RateLimiter>>) -> Self {
        debug!(
            max_retries = config.max_retries(),
            cache_enabled = config.cache_enabled(),
            rate_limited = limiter.is_some(),
            "Building resilience pipeline from config"
        );

        let cache = (*config.cache_enabled()).then(|| Arc::new(TtlCache::new(DEFAULT_TTL)));
        Self {
            cache,
            retry: RetryHandler::new(RetryPolicy::with_max_retries(*config.max_retries())),
            limiter,
        }
    }

    /// Memoize successful results in `cache`.
    pub fn with_cache(mut self, cache: Arc<TtlCache<V>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Admit every attempt through `limiter`.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Attached cache, if any.
    pub fn cache(&self) -> Option<&Arc<TtlCache<V>>> {
        self.cache.as_ref()
    }

    /// Retry handler.
    pub fn retry(&self) -> &RetryHandler {
        &self.retry
    }

    /// Attached rate limiter, if any.
    pub fn limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    /// Run `operation` through the pipeline.
    ///
    /// `args` identify the call for caching; pass the same values the
    /// operation uses.
    ///
    /// # Errors
    ///
    /// Returns the operation's last error once retry gives up, or a JSON
    /// error if `args` cannot be hashed.
    pub async fn call<A, F, Fut, E>(&self, args: &A, mut operation: F) -> Result<V, E>
    where
        A: Serialize + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: From<ConduitError> + Classified + Display,
    {
        let limiter = self.limiter.as_deref();
        let attempt = move || {
            let pending = operation();
            async move {
                if let Some(limiter) = limiter {
                    limiter.acquire().await;
                }
                pending.await
            }
        };
        let guarded = self.retry.execute(attempt);

        match &self.cache {
            Some(cache) => cache.get_or_compute(args, || guarded).await,
            None => guarded.await,
        }
    }
}
