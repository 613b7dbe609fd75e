//! TTL memo store with lazy eviction.

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

use super::clock::{Clock, SystemClock};
use crate::config::CacheConfig;

/// A cached payload and its validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Cached payload.
    pub data: V,
    /// Insertion time, epoch milliseconds.
    pub timestamp: u64,
    /// Validity window in milliseconds.
    pub ttl: u64,
}

impl<V> CacheEntry<V> {
    /// Fresh while `now - timestamp <= ttl`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) <= self.ttl
    }

    /// Milliseconds since insertion.
    #[must_use]
    pub fn age(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Lookups served from a fresh entry.
    pub hits: u64,
    /// Lookups that found nothing fresh.
    pub misses: u64,
    /// Entries removed because they expired or the cache was full.
    pub evictions: u64,
    /// Entries currently stored, fresh or not yet swept.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate (0.0 to 1.0).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Builds the conventional cache key `<path>?<query>`.
#[must_use]
pub fn request_key(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}

type FlightMap = Mutex<FxHashMap<String, Arc<AsyncMutex<()>>>>;

/// Removes a key's flight gate once nobody else holds or awaits it.
struct FlightSlot<'a> {
    flights: &'a FlightMap,
    key: &'a str,
    gate: Arc<AsyncMutex<()>>,
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        let mut flights = self.flights.lock();
        // One reference lives in the map, one here.
        if Arc::strong_count(&self.gate) <= 2 {
            flights.remove(self.key);
        }
    }
}

/// TTL-keyed memo store.
///
/// Construct one at startup and share it (`Arc<ResultCache<V>>`) with the
/// handlers that need it.
pub struct ResultCache<V> {
    entries: RwLock<FxHashMap<String, CacheEntry<V>>>,
    flights: FlightMap,
    default_ttl: Duration,
    max_entries: usize,
    single_flight: bool,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> ResultCache<V> {
    /// Creates a cache on the wall clock.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            flights: Mutex::new(FxHashMap::default()),
            default_ttl: config.default_ttl(),
            max_entries: config.max_entries.max(1),
            single_flight: config.single_flight,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// TTL applied when `set` is called without one.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns a fresh value, evicting the entry if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let found = self.lookup(key);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Returns true if a fresh entry exists. Expired entries are evicted.
    /// Does not count as a hit or miss.
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_fresh(now) => return Some(entry.data.clone()),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write();
        // Re-check: a writer may have refreshed the key between the locks.
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key, "evicted expired cache entry on read");
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`. `ttl` falls back to the default TTL.
    /// Overwrites any existing entry (last write wins).
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let ttl = ttl.unwrap_or(self.default_ttl).as_millis() as u64;
        let mut entries = self.entries.write();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now));
            let mut evicted = before - entries.len();
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.timestamp)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                    evicted += 1;
                }
            }
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            tracing::debug!(evicted, capacity = self.max_entries, "cache full, made room");
        }

        entries.insert(
            key,
            CacheEntry {
                data: value,
                timestamp: now,
                ttl,
            },
        );
    }

    /// Removes `key`. Returns true if an entry (fresh or not) was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Evicts all expired entries and returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - entries.len();
        drop(entries);

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Returns the cached value for `key`, or runs `fetcher` and caches its
    /// result.
    ///
    /// A failing fetcher propagates its error and nothing is cached. With
    /// single-flight enabled, concurrent misses on one key wait for the first
    /// computation and reuse its result; otherwise each caller computes and the
    /// last write wins.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetcher: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        if !self.single_flight {
            let value = fetcher().await?;
            self.set(key, value.clone(), ttl);
            return Ok(value);
        }

        let gate = {
            let mut flights = self.flights.lock();
            Arc::clone(
                flights
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        let slot = FlightSlot {
            flights: &self.flights,
            key,
            gate,
        };
        let _permit = slot.gate.lock().await;

        // The caller ahead of us may have filled the entry while we waited.
        if let Some(value) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        let value = fetcher().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}
