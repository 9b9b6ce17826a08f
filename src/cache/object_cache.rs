//! Object Cache Module
//!
//! The orchestrator: applies the cache-or-fetch decision per request,
//! enforces capacity via eviction, and maintains the hit/miss counters.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};
use url::Url;

use crate::cache::{CacheEntry, CacheStats, StatsSnapshot, MAX_LOCATOR_LENGTH};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::fetch::Fetcher;
use crate::store::Store;

// == Object Source ==
/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSource {
    /// Served from the store without a network fetch
    Cache,
    /// Retrieved from the network on this request
    Network,
}

// == Cached Object ==
/// A successful request result: the object bytes plus their provenance.
#[derive(Debug, Clone)]
pub struct CachedObject {
    pub payload: Bytes,
    pub source: ObjectSource,
}

// == Object Cache ==
/// Capacity-bounded, persisted object cache keyed by URL.
///
/// Composes an abstract [`Store`] and [`Fetcher`]: a request is served from
/// the store when a fresh entry exists, and otherwise fetched, stored, and
/// served. The caller learns which path ran via [`ObjectSource`].
///
/// One instance is shared freely across tasks; counters are atomic and the
/// store serializes per-locator mutation. Concurrent misses for the same
/// locator may each fetch — the store keeps whichever insert lands last.
pub struct ObjectCache {
    /// Maximum entry count; 0 means unbounded
    capacity: u64,
    /// Validity window applied when a fetch carries no expiry hint
    default_validity: Duration,
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
    stats: CacheStats,
}

impl ObjectCache {
    // == Constructors ==
    /// Creates a cache with an explicit capacity bound (`0` = unbounded)
    /// and the default validity window.
    pub fn with_capacity(
        capacity: u64,
        store: Arc<dyn Store>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            capacity,
            default_validity: Duration::from_secs(Config::default().default_validity),
            store,
            fetcher,
            stats: CacheStats::new(),
        }
    }

    /// Creates a cache with capacity and default validity taken from `config`.
    pub fn from_config(config: &Config, store: Arc<dyn Store>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            capacity: config.capacity,
            default_validity: Duration::from_secs(config.default_validity),
            store,
            fetcher,
            stats: CacheStats::new(),
        }
    }

    // == Request ==
    /// Resolves `locator` to its object bytes, from cache or network.
    ///
    /// A fresh stored entry is a hit and returns immediately with
    /// `source == Cache`. An absent or stale entry is a miss: the object is
    /// fetched, stored with `expires_at` from the response's expiry hint
    /// (or the default validity window), capacity is enforced, and the
    /// bytes return with `source == Network`. A stale entry is discarded
    /// before the fetch rather than left to rot.
    ///
    /// Exactly one outcome per call: `Ok` or `Err`, never both. A fetch
    /// failure never mutates the store, and no retry happens here.
    pub async fn request(&self, locator: &str) -> Result<CachedObject> {
        // Rejected before any async work begins
        validate_locator(locator)?;

        let now = Utc::now();
        match self.store.lookup(locator).await? {
            Some(entry) if !entry.is_expired(now) => {
                self.stats.record_hit();
                debug!(locator, "Cache hit");
                return Ok(CachedObject {
                    payload: entry.payload,
                    source: ObjectSource::Cache,
                });
            }
            Some(_) => {
                // Stale: counts as a miss, and the dead bytes go now
                self.stats.record_miss();
                debug!(locator, "Cache entry stale, discarding before refetch");
                self.store.delete(locator).await?;
            }
            None => {
                self.stats.record_miss();
                debug!(locator, "Cache miss");
            }
        }

        let fetched = self
            .fetcher
            .fetch(locator)
            .await
            .map_err(|source| CacheError::Fetch {
                locator: locator.to_string(),
                source,
            })?;

        let validity = fetched.expiry_hint.unwrap_or(self.default_validity);
        let entry = CacheEntry::new(locator, fetched.payload.clone(), validity);
        self.store.upsert(entry).await?;
        self.enforce_capacity().await?;

        Ok(CachedObject {
            payload: fetched.payload,
            source: ObjectSource::Network,
        })
    }

    // == Capacity Enforcement ==
    /// Evicts oldest-stored entries until the store fits the capacity bound.
    ///
    /// Runs after every successful insertion. Evictions bump their own
    /// counter but never hits or misses.
    async fn enforce_capacity(&self) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }

        let count = self.store.count().await?;
        if count <= self.capacity {
            return Ok(());
        }

        let excess = count - self.capacity;
        let evicted = self.store.evict_oldest(excess).await?;
        self.stats.record_evictions(evicted.len() as u64);
        for locator in &evicted {
            debug!(locator = %locator, "Evicted to honor capacity bound");
        }
        Ok(())
    }

    // == Remove ==
    /// Deletes the entry for `locator` if present.
    ///
    /// Succeeds whether or not an entry existed; fails only on a store
    /// I/O error. Counters are untouched.
    pub async fn remove(&self, locator: &str) -> Result<()> {
        validate_locator(locator)?;
        self.store.delete(locator).await?;
        debug!(locator, "Removed entry");
        Ok(())
    }

    // == Introspection ==
    /// Current number of stored entries.
    pub async fn count(&self) -> Result<u64> {
        Ok(self.store.count().await?)
    }

    /// Removes all entries and zeroes every counter.
    pub async fn reset(&self) -> Result<()> {
        self.store.delete_all().await?;
        self.stats.reset();
        info!("Cache reset: store emptied, counters zeroed");
        Ok(())
    }

    /// Removes every entry that is already stale; returns how many went.
    pub async fn sweep_expired(&self) -> Result<u64> {
        Ok(self.store.purge_expired(Utc::now()).await?)
    }

    /// Emits hit/miss/total counters and the hit ratio to the log.
    ///
    /// A pure read; no state changes.
    pub fn print_statistics(&self) {
        let snap = self.stats.snapshot();
        info!(
            hits = snap.hits,
            misses = snap.misses,
            total = snap.total_requests,
            evictions = snap.evictions,
            hit_rate = format!("{:.1}%", snap.hit_rate() * 100.0),
            "Cache statistics"
        );
    }

    // == Read-Only Accessors ==
    /// The capacity bound this instance was constructed with (0 = unbounded).
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Requests satisfied without a network fetch.
    pub fn cache_hits(&self) -> u64 {
        self.stats.hits()
    }

    /// Requests that required a network fetch.
    pub fn cache_misses(&self) -> u64 {
        self.stats.misses()
    }

    /// `cache_hits + cache_misses`.
    pub fn total_requests(&self) -> u64 {
        self.stats.total_requests()
    }

    /// Point-in-time copy of all counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

// == Locator Validation ==
/// Rejects empty, oversized, or unparseable locators synchronously.
fn validate_locator(locator: &str) -> Result<()> {
    if locator.is_empty() {
        return Err(CacheError::InvalidLocator("empty locator".to_string()));
    }
    if locator.len() > MAX_LOCATOR_LENGTH {
        return Err(CacheError::InvalidLocator(format!(
            "locator exceeds maximum length of {} bytes",
            MAX_LOCATOR_LENGTH
        )));
    }
    if Url::parse(locator).is_err() {
        return Err(CacheError::InvalidLocator(format!(
            "not a parseable URL: {locator}"
        )));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedObject;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed payload and counts how often it is asked.
    struct CountingFetcher {
        payload: Bytes,
        expiry_hint: Option<Duration>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(payload: &'static [u8], expiry_hint: Option<Duration>) -> Self {
            Self {
                payload: Bytes::from_static(payload),
                expiry_hint,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, _locator: &str) -> std::result::Result<FetchedObject, crate::error::FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedObject {
                payload: self.payload.clone(),
                expiry_hint: self.expiry_hint,
            })
        }
    }

    fn cache_with(
        capacity: u64,
        fetcher: Arc<CountingFetcher>,
    ) -> ObjectCache {
        ObjectCache::with_capacity(capacity, Arc::new(MemoryStore::new()), fetcher)
    }

    #[tokio::test]
    async fn test_first_request_fetches() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(0, fetcher.clone());

        let got = cache.request("https://example.com/a").await.unwrap();
        assert_eq!(got.source, ObjectSource::Network);
        assert_eq!(got.payload.as_ref(), b"bytes");
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.cache_misses(), 1);
        assert_eq!(cache.cache_hits(), 0);
    }

    #[tokio::test]
    async fn test_second_request_hits() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(0, fetcher.clone());

        cache.request("https://example.com/a").await.unwrap();
        let got = cache.request("https://example.com/a").await.unwrap();

        assert_eq!(got.source, ObjectSource::Cache);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.cache_hits(), 1);
        assert_eq!(cache.cache_misses(), 1);
        assert_eq!(cache.total_requests(), 2);
    }

    #[tokio::test]
    async fn test_zero_hint_entry_is_stale_on_next_request() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", Some(Duration::ZERO)));
        let cache = cache_with(0, fetcher.clone());

        cache.request("https://example.com/a").await.unwrap();
        let got = cache.request("https://example.com/a").await.unwrap();

        // The entry existed but was stale, so it refetched
        assert_eq!(got.source, ObjectSource::Network);
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.cache_misses(), 2);
    }

    #[tokio::test]
    async fn test_invalid_locators_rejected() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(0, fetcher.clone());

        let too_long = "x".repeat(MAX_LOCATOR_LENGTH + 1);
        for bad in ["", "not a url", too_long.as_str()] {
            let err = cache.request(bad).await.unwrap_err();
            assert!(matches!(err, CacheError::InvalidLocator(_)));
        }

        // Rejection happens before any counter or fetcher activity
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(cache.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_remove_absent_succeeds() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(0, fetcher);

        cache.remove("https://example.com/never-stored").await.unwrap();
        assert_eq!(cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(2, fetcher);

        cache.request("https://example.com/a").await.unwrap();
        cache.request("https://example.com/b").await.unwrap();
        cache.request("https://example.com/c").await.unwrap();

        assert_eq!(cache.count().await.unwrap(), 2);
        assert_eq!(cache.stats().evictions, 1);

        // The oldest insertion was evicted; a refetch proves it is gone
        let got = cache.request("https://example.com/a").await.unwrap();
        assert_eq!(got.source, ObjectSource::Network);
    }

    #[tokio::test]
    async fn test_reset_zeroes_store_and_counters() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", None));
        let cache = cache_with(0, fetcher);

        cache.request("https://example.com/a").await.unwrap();
        cache.request("https://example.com/a").await.unwrap();
        assert!(cache.total_requests() > 0);

        cache.reset().await.unwrap();
        assert_eq!(cache.count().await.unwrap(), 0);
        assert_eq!(cache.cache_hits(), 0);
        assert_eq!(cache.cache_misses(), 0);
        assert_eq!(cache.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let fetcher = Arc::new(CountingFetcher::new(b"bytes", Some(Duration::ZERO)));
        let cache = cache_with(0, fetcher);

        cache.request("https://example.com/a").await.unwrap();
        assert_eq!(cache.count().await.unwrap(), 1);

        let removed = cache.sweep_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(cache.count().await.unwrap(), 0);
    }
}
