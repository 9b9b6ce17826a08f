//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Hit/miss/eviction counters shared across all in-flight requests.
///
/// Counters are atomic so concurrent requests can record outcomes without
/// taking a lock; they increase monotonically for the instance's lifetime
/// except through [`CacheStats::reset`].
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Requests satisfied from the store without a network fetch
    hits: AtomicU64,
    /// Requests that required a network fetch (absent or stale entry)
    misses: AtomicU64,
    /// Entries removed to keep the store within its capacity bound
    evictions: AtomicU64,
}

// == Stats Snapshot ==
/// A point-in-time copy of the counters, plus derived totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// `hits + misses`
    pub total_requests: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Evictions ==
    /// Adds `n` to the eviction counter.
    pub fn record_evictions(&self, n: u64) {
        self.evictions.fetch_add(n, Ordering::Relaxed);
    }

    // == Accessors ==
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Total requests observed: `hits + misses`.
    pub fn total_requests(&self) -> u64 {
        self.hits() + self.misses()
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of all counters.
    ///
    /// Each counter is read independently, so a snapshot taken under
    /// concurrent traffic is consistent per counter, not across counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits();
        let misses = self.misses();
        StatsSnapshot {
            hits,
            misses,
            evictions: self.evictions(),
            total_requests: hits + misses,
        }
    }

    // == Reset ==
    /// Zeroes all counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }
}
