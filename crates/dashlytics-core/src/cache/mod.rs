//! Result cache for per-request computations.
//!
//! A TTL-keyed memo store shared across concurrent requests:
//! - entries are fresh while `now - timestamp <= ttl`
//! - expired entries are evicted lazily on `get`/`has` and by `cleanup`
//! - a [`CacheSweeper`] task calls `cleanup` periodically so memory stays
//!   bounded without reads
//!
//! # Thread-Safety
//!
//! The entry map sits behind a `parking_lot::RwLock`; no lock is held across
//! an `.await`. [`ResultCache::get_or_compute`] optionally serializes
//! concurrent misses on the same key (single-flight) with a per-key async
//! mutex.

mod clock;
mod result_cache;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use result_cache::{request_key, CacheEntry, CacheStats, ResultCache};
pub use sweeper::CacheSweeper;

#[cfg(test)]
mod tests;
