//! Tests for the result cache.

use super::*;
use crate::config::CacheConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn config() -> CacheConfig {
    CacheConfig {
        default_ttl_ms: 1_000,
        sweep_interval_ms: 100,
        max_entries: 100,
        single_flight: true,
    }
}

fn manual_cache(config: &CacheConfig) -> (ResultCache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let cache = ResultCache::with_clock(config, Arc::clone(&clock) as Arc<dyn Clock>);
    (cache, clock)
}

// =========================================================================
// Basic operations
// =========================================================================

#[test]
fn test_set_and_get() {
    // Arrange
    let (cache, _clock) = manual_cache(&config());

    // Act
    cache.set("k", "v".to_string(), None);

    // Assert
    assert_eq!(cache.get("k"), Some("v".to_string()));
    assert!(cache.has("k"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_get_missing_returns_none() {
    let (cache, _clock) = manual_cache(&config());

    assert_eq!(cache.get("absent"), None);
    assert!(!cache.has("absent"));
}

#[test]
fn test_set_overwrites_last_write_wins() {
    let (cache, _clock) = manual_cache(&config());

    cache.set("k", "first".to_string(), None);
    cache.set("k", "second".to_string(), None);

    assert_eq!(cache.get("k"), Some("second".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_delete_and_clear() {
    let (cache, _clock) = manual_cache(&config());
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);

    assert!(cache.delete("a"));
    assert!(!cache.delete("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get("b"), None);
}

// =========================================================================
// TTL
// =========================================================================

#[test]
fn test_entry_expires_after_ttl() {
    // Arrange
    let (cache, clock) = manual_cache(&config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(100)));

    // Act & Assert: still fresh at 50ms
    clock.advance(Duration::from_millis(50));
    assert_eq!(cache.get("k"), Some("v".to_string()));

    // Act & Assert: gone at 150ms, and evicted on read
    clock.advance(Duration::from_millis(100));
    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_entry_fresh_exactly_at_ttl_boundary() {
    let (cache, clock) = manual_cache(&config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(100)));

    clock.advance(Duration::from_millis(100));
    assert!(cache.has("k"));

    clock.advance(Duration::from_millis(1));
    assert!(!cache.has("k"));
}

#[test]
fn test_default_ttl_applies_when_none_given() {
    let (cache, clock) = manual_cache(&config());
    assert_eq!(cache.default_ttl(), Duration::from_millis(1_000));

    cache.set("k", "v".to_string(), None);
    clock.advance(Duration::from_millis(999));
    assert!(cache.has("k"));

    clock.advance(Duration::from_millis(2));
    assert!(!cache.has("k"));
}

#[test]
fn test_cleanup_removes_only_expired() {
    // Arrange
    let (cache, clock) = manual_cache(&config());
    cache.set("short", "s".to_string(), Some(Duration::from_millis(10)));
    cache.set("long", "l".to_string(), Some(Duration::from_secs(60)));
    clock.advance(Duration::from_millis(20));

    // Act
    let removed = cache.cleanup();

    // Assert
    assert_eq!(removed, 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.has("long"));
}

#[test]
fn test_cache_entry_freshness() {
    let entry = CacheEntry {
        data: 1_u8,
        timestamp: 1_000,
        ttl: 50,
    };

    assert!(entry.is_fresh(1_050));
    assert!(!entry.is_fresh(1_051));
    assert_eq!(entry.age(1_030), 30);
    assert_eq!(entry.age(900), 0);
}

// =========================================================================
// Capacity
// =========================================================================

#[test]
fn test_capacity_sweeps_expired_before_evicting_fresh() {
    // Arrange
    let mut cfg = config();
    cfg.max_entries = 2;
    let (cache, clock) = manual_cache(&cfg);
    cache.set("stale", "s".to_string(), Some(Duration::from_millis(10)));
    clock.advance(Duration::from_millis(5));
    cache.set("fresh", "f".to_string(), None);
    clock.advance(Duration::from_millis(10));

    // Act
    cache.set("new", "n".to_string(), None);

    // Assert
    assert_eq!(cache.len(), 2);
    assert!(cache.has("fresh"));
    assert!(cache.has("new"));
}

#[test]
fn test_capacity_evicts_oldest_when_all_fresh() {
    let mut cfg = config();
    cfg.max_entries = 2;
    let (cache, clock) = manual_cache(&cfg);
    cache.set("a", "1".to_string(), None);
    clock.advance(Duration::from_millis(1));
    cache.set("b", "2".to_string(), None);
    clock.advance(Duration::from_millis(1));

    cache.set("c", "3".to_string(), None);

    assert_eq!(cache.len(), 2);
    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_overwrite_at_capacity_does_not_evict() {
    let mut cfg = config();
    cfg.max_entries = 1;
    let (cache, _clock) = manual_cache(&cfg);

    cache.set("a", "1".to_string(), None);
    cache.set("a", "2".to_string(), None);

    assert_eq!(cache.get("a"), Some("2".to_string()));
    assert_eq!(cache.stats().evictions, 0);
}

// =========================================================================
// Stats and keys
// =========================================================================

#[test]
fn test_stats_track_hits_misses_evictions() {
    // Arrange
    let (cache, clock) = manual_cache(&config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(10)));

    // Act
    let _ = cache.get("k");
    let _ = cache.get("nope");
    clock.advance(Duration::from_millis(20));
    let _ = cache.get("k");

    // Assert
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.entries, 0);
    assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_hit_rate_empty_is_zero() {
    assert_eq!(CacheStats::default().hit_rate(), 0.0);
}

#[test]
fn test_stats_serialize_camel_case() {
    let stats = CacheStats {
        hits: 3,
        misses: 1,
        evictions: 0,
        entries: 2,
    };

    let json = serde_json::to_value(stats).expect("serialize");

    assert_eq!(json["hits"], 3);
    assert_eq!(json["entries"], 2);
}

#[test]
fn test_request_key() {
    assert_eq!(request_key("/api/sales", Some("days=7")), "/api/sales?days=7");
    assert_eq!(request_key("/api/sales", Some("")), "/api/sales");
    assert_eq!(request_key("/api/sales", None), "/api/sales");
}

// =========================================================================
// get_or_compute
// =========================================================================

#[tokio::test]
async fn test_get_or_compute_caches_result() {
    // Arrange
    let (cache, _clock) = manual_cache(&config());
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    // Act
    for _ in 0..3 {
        let value: Result<String, ()> = cache
            .get_or_compute("k", None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("computed".to_string())
            })
            .await;
        assert_eq!(value, Ok("computed".to_string()));
    }

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_or_compute_error_is_not_cached() {
    let (cache, _clock) = manual_cache(&config());

    let failed: Result<String, &str> = cache
        .get_or_compute("k", None, || async { Err("upstream down") })
        .await;
    assert_eq!(failed, Err("upstream down"));
    assert!(!cache.has("k"));

    let ok: Result<String, &str> = cache
        .get_or_compute("k", None, || async { Ok("fine".to_string()) })
        .await;
    assert_eq!(ok, Ok("fine".to_string()));
    assert!(cache.has("k"));
}

#[tokio::test]
async fn test_get_or_compute_recomputes_after_expiry() {
    let (cache, clock) = manual_cache(&config());
    let ttl = Some(Duration::from_millis(100));

    let first: Result<String, ()> = cache
        .get_or_compute("k", ttl, || async { Ok("one".to_string()) })
        .await;
    clock.advance(Duration::from_millis(200));
    let second: Result<String, ()> = cache
        .get_or_compute("k", ttl, || async { Ok("two".to_string()) })
        .await;

    assert_eq!(first, Ok("one".to_string()));
    assert_eq!(second, Ok("two".to_string()));
}

#[tokio::test]
async fn test_single_flight_runs_fetcher_once() {
    // Arrange
    let (cache, _clock) = manual_cache(&config());
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let fetch = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok::<_, ()>("shared".to_string())
    };

    // Act
    let (a, b, c) = tokio::join!(
        cache.get_or_compute("k", None, fetch),
        cache.get_or_compute("k", None, fetch),
        cache.get_or_compute("k", None, fetch),
    );

    // Assert
    assert_eq!(a, Ok("shared".to_string()));
    assert_eq!(b, Ok("shared".to_string()));
    assert_eq!(c, Ok("shared".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_flight_waiters_count_as_hits() {
    // Arrange
    let (cache, _clock) = manual_cache(&config());
    let fetch = || async {
        tokio::task::yield_now().await;
        Ok::<_, ()>("shared".to_string())
    };

    // Act
    let _ = tokio::join!(
        cache.get_or_compute("k", None, fetch),
        cache.get_or_compute("k", None, fetch),
        cache.get_or_compute("k", None, fetch),
    );

    // Assert: every caller missed on entry, the two waiters were then served.
    let stats = cache.stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 2);
}

#[tokio::test]
async fn test_without_single_flight_each_caller_computes() {
    let mut cfg = config();
    cfg.single_flight = false;
    let (cache, _clock) = manual_cache(&cfg);
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let fetch = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok::<_, ()>(calls.load(Ordering::SeqCst).to_string())
    };

    let (a, b) = tokio::join!(
        cache.get_or_compute("k", None, fetch),
        cache.get_or_compute("k", None, fetch),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(cache.has("k"));
}
