//! Retry with bounded exponential backoff.

use conduit_error::{Classified, ErrorClass};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Immutable retry settings shared by every call a handler wraps.
///
/// # Examples
///
/// ```
/// use conduit_error::ErrorClass;
/// use conduit_rate_limit::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_retries(5u32)
///     .base_delay(Duration::from_millis(500))
///     .jitter(false)
///     .retry_on([ErrorClass::Timeout, ErrorClass::Network].into_iter().collect::<std::collections::BTreeSet<_>>())
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.delay_for(1), Duration::from_millis(500));
/// assert_eq!(policy.delay_for(3), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct RetryPolicy {
    /// Total attempts allowed; 0 and 1 both mean a single attempt
    #[builder(default = "3")]
    max_retries: u32,

    /// Delay before the first retry
    #[builder(default = "Duration::from_secs(1)")]
    base_delay: Duration,

    /// Cap applied before jitter
    #[builder(default = "Duration::from_secs(60)")]
    max_delay: Duration,

    /// Scale each delay by a random factor in `[0.5, 1.5)`
    #[builder(default = "true")]
    jitter: bool,

    /// Failure classes that trigger a retry
    #[builder(default = "ErrorClass::iter().collect()")]
    retry_on: BTreeSet<ErrorClass>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: true,
            retry_on: ErrorClass::iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// Creates a new policy builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Default policy with a different attempt budget.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay to wait after the `attempt`-th failure (1-indexed).
    ///
    /// `min(base_delay * 2^(attempt - 1), max_delay)`, scaled by jitter when enabled.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let uncapped = self.base_delay.as_secs_f64() * 2f64.powi(exponent);
        let mut delay = uncapped.min(self.max_delay.as_secs_f64());

        if self.jitter {
            delay *= rand::thread_rng().gen_range(0.5..1.5);
        }

        Duration::try_from_secs_f64(delay).unwrap_or(self.max_delay)
    }

    /// Whether failures of `class` are retried.
    pub fn retries(&self, class: ErrorClass) -> bool {
        self.retry_on.contains(&class)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delays between consecutive attempts, one fewer than the attempt budget.
    fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.attempts()).map(move |attempt| self.delay_for(attempt))
    }
}

/// Wraps async operations with bounded exponential-backoff retry.
///
/// A failure whose class is not in the policy's `retry_on` set propagates on
/// first occurrence. Retryable failures are retried until the attempt budget
/// is spent, after which the last failure is returned exactly as the
/// operation produced it.
///
/// # Example
///
/// ```rust,ignore
/// let handler = RetryHandler::new(RetryPolicy::default());
///
/// let response = handler.execute(|| async {
///     client.complete(&request).await
/// }).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryHandler {
    policy: Arc<RetryPolicy>,
}

impl RetryHandler {
    /// Create a handler for the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        debug!(
            max_retries = policy.max_retries,
            base_delay = ?policy.base_delay,
            max_delay = ?policy.max_delay,
            jitter = policy.jitter,
            "Creating new RetryHandler"
        );
        Self {
            policy: Arc::new(policy),
        }
    }

    /// The policy this handler applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation`, retrying retryable failures with backoff.
    #[instrument(skip(self, operation), fields(max_retries = self.policy.max_retries))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classified + Display,
    {
        let policy = &*self.policy;
        let budget = policy.attempts();
        let mut attempt: u32 = 0;

        Retry::spawn(policy.schedule(), || {
            attempt += 1;
            let current = attempt;
            let pending = operation();

            async move {
                match pending.await {
                    Ok(value) => {
                        if current > 1 {
                            debug!(attempt = current, "Operation succeeded after retry");
                        }
                        Ok(value)
                    }
                    Err(e) => {
                        let class = e.class();
                        if !policy.retries(class) {
                            warn!(%class, error = %e, "Permanent error, failing immediately");
                            Err(RetryError::Permanent(e))
                        } else if current >= budget {
                            warn!(attempts = current, error = %e, "Retry budget exhausted");
                            Err(RetryError::Permanent(e))
                        } else {
                            warn!(attempt = current, %class, error = %e, "Transient error, will retry");
                            Err(RetryError::Transient {
                                err: e,
                                retry_after: None,
                            })
                        }
                    }
                }
            }
        })
        .await
    }
}
