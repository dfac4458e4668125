//! Tests for retry with exponential backoff.

use conduit_error::{ConduitError, ErrorClass, HttpError, HttpErrorKind, UnexpectedError};
use conduit_rate_limit::{RetryHandler, RetryPolicy};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn policy(max_retries: u32, retry_on: &[ErrorClass]) -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_secs(1))
        .jitter(false)
        .retry_on(retry_on.iter().copied().collect::<std::collections::BTreeSet<_>>())
        .build()
        .unwrap()
}

fn timeout_error() -> ConduitError {
    HttpError::new(HttpErrorKind::Timeout).into()
}

/// Records the instant of every attempt and always fails with `make_error`.
async fn always_failing(
    handler: &RetryHandler,
    make_error: fn() -> ConduitError,
) -> (Result<(), ConduitError>, Vec<Instant>) {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&attempts);

    let result = handler
        .execute(|| {
            let recorder = Arc::clone(&recorder);
            async move {
                recorder.lock().unwrap().push(Instant::now());
                Err::<(), _>(make_error())
            }
        })
        .await;

    let times = attempts.lock().unwrap().clone();
    (result, times)
}

#[tokio::test(start_paused = true)]
async fn test_exhausts_budget_with_backoff() {
    let handler = RetryHandler::new(policy(3, &[ErrorClass::Timeout]));

    let (result, times) = always_failing(&handler, timeout_error).await;

    assert_eq!(times.len(), 3, "operation should run exactly 3 times");
    let err = result.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Timeout);

    let first_gap = times[1].duration_since(times[0]);
    let second_gap = times[2].duration_since(times[1]);
    assert!(first_gap >= Duration::from_secs(1) && first_gap < Duration::from_millis(1050));
    assert!(second_gap >= Duration::from_secs(2) && second_gap < Duration::from_millis(2050));
}

#[tokio::test(start_paused = true)]
async fn test_final_error_is_returned_unchanged() {
    let handler = RetryHandler::new(policy(2, &[ErrorClass::HttpClient]));
    let calls = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&calls);

    let result: Result<(), ConduitError> = handler
        .execute(|| {
            let counter = Arc::clone(&counter);
            async move {
                let mut n = counter.lock().unwrap();
                *n += 1;
                Err(HttpError::new(HttpErrorKind::Client(format!("failure #{}", *n))).into())
            }
        })
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("failure #2"), "got: {message}");
    assert!(!message.contains("attempt"), "no retry bookkeeping in message");
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_fails_immediately() {
    let handler = RetryHandler::new(policy(5, &[ErrorClass::Timeout, ErrorClass::Network]));
    let start = Instant::now();

    let (result, times) = always_failing(&handler, || UnexpectedError::new("bad input").into()).await;

    assert_eq!(times.len(), 1);
    assert_eq!(result.unwrap_err().class(), ErrorClass::Unexpected);
    assert_eq!(start.elapsed(), Duration::ZERO, "no backoff for permanent errors");
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget() {
    let handler = RetryHandler::new(policy(1, &[ErrorClass::Timeout]));
    let start = Instant::now();

    let (result, times) = always_failing(&handler, timeout_error).await;

    assert_eq!(times.len(), 1);
    assert!(result.is_err());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() {
    let handler = RetryHandler::new(policy(4, &[ErrorClass::Network]));
    let calls = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&calls);

    let result = handler
        .execute(|| {
            let counter = Arc::clone(&counter);
            async move {
                let mut n = counter.lock().unwrap();
                *n += 1;
                if *n < 3 {
                    Err(ConduitError::from(HttpError::new(HttpErrorKind::Network)))
                } else {
                    Ok("response")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "response");
    assert_eq!(*calls.lock().unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_first_success_has_no_delay() {
    let handler = RetryHandler::default();
    let start = Instant::now();

    let result: Result<u8, ConduitError> = handler.execute(|| async { Ok(7) }).await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(start.elapsed(), Duration::ZERO);
}
