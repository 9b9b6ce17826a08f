//! Shared Cache Module
//!
//! The process-wide default cache instance: a `FileStore` at the configured
//! cache directory behind an `HttpFetcher`, built from the environment and
//! initialized exactly once no matter how many tasks race to first use.

use std::sync::{Arc, OnceLock, RwLock};

use crate::cache::ObjectCache;
use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::store::FileStore;

static SHARED: OnceLock<RwLock<Arc<ObjectCache>>> = OnceLock::new();

fn build_default_cache() -> Arc<ObjectCache> {
    let config = Config::from_env();
    let store = Arc::new(FileStore::new(config.cache_dir.clone()));
    let fetcher = Arc::new(HttpFetcher::new(&config));
    Arc::new(ObjectCache::from_config(&config, store, fetcher))
}

fn shared_slot() -> &'static RwLock<Arc<ObjectCache>> {
    SHARED.get_or_init(|| RwLock::new(build_default_cache()))
}

// == Shared Cache Accessor ==
/// Returns the process-wide default cache.
///
/// Repeated calls return the same instance; concurrent first calls cannot
/// create two. Independent instances from [`ObjectCache::with_capacity`]
/// share nothing with this one.
pub fn shared_cache() -> Arc<ObjectCache> {
    shared_slot()
        .read()
        .expect("shared cache lock poisoned")
        .clone()
}

// == Test Reset Hook ==
/// Swaps in a freshly built default instance.
///
/// Test builds only: lets a test observe first-use behavior again after
/// earlier tests touched the shared instance.
#[cfg(test)]
pub fn reset_shared_for_tests() {
    let fresh = build_default_cache();
    *shared_slot().write().expect("shared cache lock poisoned") = fresh;
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    // One test body: the shared slot is process-wide, so parallel tests
    // poking at it would race each other's observations.
    #[test]
    fn test_shared_cache_lifecycle() {
        // Repeated calls return the same instance
        let a = shared_cache();
        let b = shared_cache();
        assert!(Arc::ptr_eq(&a, &b));

        // Concurrent callers all see one instance
        let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(shared_cache)).collect();
        for handle in handles {
            assert!(Arc::ptr_eq(&a, &handle.join().unwrap()));
        }

        // The test hook swaps in a fresh instance
        reset_shared_for_tests();
        let after = shared_cache();
        assert!(!Arc::ptr_eq(&a, &after));
    }
}
