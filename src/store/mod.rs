//! Store Module
//!
//! The persistence seam of the cache: a keyed store for [`CacheEntry`]
//! records, durable or volatile depending on the implementation.

mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;

use crate::cache::CacheEntry;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Store Trait ==
/// Abstract keyed storage for cache entries.
///
/// A locator maps to at most one entry at any instant; `upsert` with an
/// existing locator replaces the prior record. All methods report failures
/// as `io::Error` — the orchestrator wraps them into its own error type.
#[async_trait]
pub trait Store: Send + Sync {
    /// Looks up the entry for `locator`, or `None` if absent.
    async fn lookup(&self, locator: &str) -> io::Result<Option<CacheEntry>>;

    /// Inserts or replaces the entry for its locator.
    async fn upsert(&self, entry: CacheEntry) -> io::Result<()>;

    /// Deletes the entry for `locator`. Deleting an absent key is not an error.
    async fn delete(&self, locator: &str) -> io::Result<()>;

    /// Deletes every entry.
    async fn delete_all(&self) -> io::Result<()>;

    /// Returns the current number of stored entries.
    async fn count(&self) -> io::Result<u64>;

    /// Removes the `excess` entries with the smallest `stored_at` values,
    /// ties broken by locator ordering, and returns their locators
    /// oldest-first.
    async fn evict_oldest(&self, excess: u64) -> io::Result<Vec<String>>;

    /// Deletes every entry with `expires_at <= now` and returns how many
    /// were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> io::Result<u64>;
}
