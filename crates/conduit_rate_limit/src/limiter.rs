//! Sliding-window rate limiter.
//!
//! The limiter keeps a window of admission instants. Before each admission
//! it drops every instant that has left the trailing interval, and if the
//! remaining admissions already reach the limit it sleeps until the oldest one
//! leaves. All of this happens under a single Tokio mutex, so two callers can
//! never both see free capacity and both be admitted past the bound.

use std::collections::BTreeMap;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

/// Admission counts keyed by the instant they were granted.
type RateWindow = BTreeMap<Instant, u32>;

/// Bounds the number of operations started within a trailing interval.
///
/// Callers `acquire()` before doing work; the call suspends until one more
/// admission fits in the window. It never fails.
///
/// An interval of zero disables throttling: every previous admission has
/// already left the window by the time the next caller checks.
///
/// # Example
///
/// ```rust,ignore
/// use conduit_rate_limit::RateLimiter;
/// use std::num::NonZeroU32;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(NonZeroU32::new(10).unwrap(), Duration::from_secs(1));
///
/// limiter.acquire().await;
/// let response = client.send(&request).await?;
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: NonZeroU32,
    interval: Duration,
    window: Mutex<RateWindow>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per `interval`.
    pub fn new(max_requests: NonZeroU32, interval: Duration) -> Self {
        debug!(
            max_requests = max_requests.get(),
            interval = ?interval,
            "Creating new RateLimiter"
        );
        Self {
            max_requests,
            interval,
            window: Mutex::new(RateWindow::new()),
        }
    }

    /// Create a limiter admitting `max_requests` per second.
    pub fn per_second(max_requests: NonZeroU32) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Maximum admissions per interval.
    pub fn max_requests(&self) -> NonZeroU32 {
        self.max_requests
    }

    /// Length of the trailing interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until one more admission fits in the window, then record it.
    ///
    /// Admissions granted at the same instant accumulate a count. Dropping the
    /// returned future while it waits releases the window lock and records
    /// nothing.
    #[instrument(
        skip(self),
        fields(max_requests = self.max_requests.get(), interval = ?self.interval)
    )]
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        loop {
            let now = Instant::now();
            self.purge(&mut window, now);

            let admitted: u32 = window.values().sum();
            if admitted < self.max_requests.get() {
                *window.entry(now).or_insert(0) += 1;
                trace!(admitted = admitted + 1, "Admission granted");
                return;
            }

            let Some(oldest) = window.keys().next().copied() else {
                // unreachable with a non-zero limit
                return;
            };
            let wait = (oldest + self.interval).saturating_duration_since(now);
            debug!(admitted, wait = ?wait, "Rate limit reached, waiting for window");
            tokio::time::sleep(wait).await;
        }
    }

    /// Try to record an admission without waiting.
    ///
    /// Returns `false` if the window is full or another caller currently
    /// holds it.
    pub fn try_acquire(&self) -> bool {
        let Ok(mut window) = self.window.try_lock() else {
            return false;
        };

        let now = Instant::now();
        self.purge(&mut window, now);

        let admitted: u32 = window.values().sum();
        if admitted >= self.max_requests.get() {
            return false;
        }

        *window.entry(now).or_insert(0) += 1;
        true
    }

    /// Number of admissions currently inside the trailing interval.
    pub async fn admitted_in_window(&self) -> u32 {
        let mut window = self.window.lock().await;
        self.purge(&mut window, Instant::now());
        window.values().sum()
    }

    /// Acquire an admission, then run the operation.
    ///
    /// The operation's output is returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let body = limiter.execute(|| async {
    ///     client.get(url).send().await?.text().await
    /// }).await?;
    /// ```
    pub async fn execute<F, Fut>(&self, operation: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.acquire().await;
        operation().await
    }

    /// Drop admissions that have left the trailing interval.
    fn purge(&self, window: &mut RateWindow, now: Instant) {
        window.retain(|admitted_at, _| now.duration_since(*admitted_at) < self.interval);
    }
}
