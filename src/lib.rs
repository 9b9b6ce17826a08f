//! Asset Cache - A capacity-bounded, persisted object cache keyed by URL
//!
//! Serves a locally stored copy of a remote object when one exists and is
//! unexpired, and otherwise fetches, stores, and serves it — telling the
//! caller which path ran.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod store;
pub mod tasks;

pub use cache::{shared_cache, CacheEntry, CachedObject, ObjectCache, ObjectSource, StatsSnapshot};
pub use config::Config;
pub use error::{CacheError, FetchError, Result};
pub use fetch::{FetchedObject, Fetcher, HttpFetcher};
pub use store::{FileStore, MemoryStore, Store};
pub use tasks::spawn_sweep_task;
