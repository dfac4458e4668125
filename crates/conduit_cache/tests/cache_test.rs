//! Tests for the TTL cache.

use conduit_cache::{CallArgs, TtlCache, cache_key};
use conduit_error::{ConduitError, ErrorClass, HttpError, HttpErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_set_then_get() {
    let cache = TtlCache::new(Duration::from_secs(60));

    cache.set("answer", 42u32).await;

    assert_eq!(cache.get("answer").await, Some(42));
    assert_eq!(cache.get("missing").await, None);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = TtlCache::new(Duration::from_secs(1));
    cache.set("k", "v".to_string()).await;

    tokio::time::advance(Duration::from_millis(1000)).await;
    assert_eq!(cache.get("k").await.as_deref(), Some("v"), "valid at expiry instant");

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get("k").await, None);
    assert!(cache.is_empty().await, "expired entry removed on lookup");
}

#[tokio::test(start_paused = true)]
async fn test_set_refreshes_expiry() {
    let cache = TtlCache::new(Duration::from_secs(2));
    cache.set("k", 1u8).await;

    tokio::time::advance(Duration::from_millis(1500)).await;
    cache.set("k", 2u8).await;

    tokio::time::advance(Duration::from_millis(1500)).await;
    assert_eq!(cache.get("k").await, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_expired_counts_removed() {
    let cache = TtlCache::new(Duration::from_secs(1));
    cache.set("a", 1u8).await;
    cache.set("b", 2u8).await;

    tokio::time::advance(Duration::from_secs(2)).await;
    cache.set("c", 3u8).await;

    assert_eq!(cache.cleanup_expired().await, 2);
    assert_eq!(cache.len().await, 1);

    cache.clear().await;
    assert!(cache.is_empty().await);
}

#[test]
fn test_keyword_order_does_not_change_key() {
    let a = CallArgs::new()
        .arg("prompt")
        .kwarg("temperature", 0.5)
        .kwarg("model", "gpt-4o");
    let b = CallArgs::new()
        .arg("prompt")
        .kwarg("model", "gpt-4o")
        .kwarg("temperature", 0.5);

    assert_eq!(cache_key(&a).unwrap(), cache_key(&b).unwrap());
}

#[test]
fn test_hash_map_arguments_have_stable_key() {
    let mut first = HashMap::new();
    let mut second = HashMap::new();
    for (k, v) in [("alpha", 1), ("beta", 2), ("gamma", 3), ("delta", 4)] {
        first.insert(k, v);
    }
    for (k, v) in [("delta", 4), ("gamma", 3), ("beta", 2), ("alpha", 1)] {
        second.insert(k, v);
    }

    assert_eq!(cache_key(&first).unwrap(), cache_key(&second).unwrap());
}

#[test]
fn test_different_arguments_have_different_keys() {
    let base = CallArgs::new().arg("prompt").kwarg("temperature", 0.5);

    let other_value = CallArgs::new().arg("prompt").kwarg("temperature", 0.6);
    let other_position = CallArgs::new().arg("prompt").arg(0.5);

    let key = cache_key(&base).unwrap();
    assert_ne!(key, cache_key(&other_value).unwrap());
    assert_ne!(key, cache_key(&other_position).unwrap());
}

#[test]
fn test_unserializable_arguments_are_json_errors() {
    let mut bad = HashMap::new();
    bad.insert(vec![1u8, 2], "non-string key");

    let err = cache_key(&bad).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unexpected);
    assert!(err.to_string().contains("cache key"));
}

#[tokio::test(start_paused = true)]
async fn test_get_or_compute_hits_after_miss() {
    let cache = TtlCache::new(Duration::from_secs(60));
    let calls = AtomicU32::new(0);
    let args = CallArgs::new().arg("What is Rust?");

    for _ in 0..3 {
        let value = cache
            .get_or_compute(&args, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ConduitError>("A systems language".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "A systems language");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_get_or_compute_recomputes_after_expiry() {
    let cache = TtlCache::new(Duration::from_secs(5));
    let calls = AtomicU32::new(0);
    let args = CallArgs::new().kwarg("q", "x");

    let compute = || async {
        Ok::<_, ConduitError>(calls.fetch_add(1, Ordering::SeqCst))
    };

    assert_eq!(cache.get_or_compute(&args, compute).await.unwrap(), 0);
    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(cache.get_or_compute(&args, compute).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_not_cached() {
    let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(60));
    let calls = AtomicU32::new(0);
    let args = CallArgs::new().arg("flaky");

    let first = cache
        .get_or_compute(&args, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ConduitError::from(HttpError::new(HttpErrorKind::Timeout)))
        })
        .await;
    assert_eq!(first.unwrap_err().class(), ErrorClass::Timeout);
    assert!(cache.is_empty().await);

    let second = cache
        .get_or_compute(&args, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ConduitError>("ok".to_string())
        })
        .await;
    assert_eq!(second.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_cache_always_computes() {
    let cache = TtlCache::new(Duration::from_secs(60)).with_enabled(false);
    let calls = AtomicU32::new(0);
    let args = CallArgs::new().arg("same");

    for _ in 0..2 {
        cache
            .get_or_compute(&args, || async {
                Ok::<_, ConduitError>(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await
            .unwrap();
    }
    cache.set("k", 1).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.get("k").await, None);
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_each_compute() {
    let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
    let calls = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            let args = CallArgs::new().arg("slow");
            cache
                .get_or_compute(&args, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, ConduitError>("done")
                })
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "done");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len().await, 1);
}
