//! Memory Store Module
//!
//! Volatile implementation of the [`Store`] trait, backed by a locked
//! HashMap. Used by tests and by embedders that do not need persistence.

use std::collections::HashMap;
use std::io;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::CacheEntry;
use crate::store::Store;

// == Memory Store ==
/// In-memory entry store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn lookup(&self, locator: &str) -> io::Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(locator).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> io::Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.locator.clone(), entry);
        Ok(())
    }

    async fn delete(&self, locator: &str) -> io::Result<()> {
        self.entries.write().await.remove(locator);
        Ok(())
    }

    async fn delete_all(&self) -> io::Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> io::Result<u64> {
        Ok(self.entries.read().await.len() as u64)
    }

    async fn evict_oldest(&self, excess: u64) -> io::Result<Vec<String>> {
        let mut entries = self.entries.write().await;

        let mut by_age: Vec<(DateTime<Utc>, String)> = entries
            .values()
            .map(|entry| (entry.stored_at, entry.locator.clone()))
            .collect();
        // Oldest first; locator order makes equal timestamps deterministic
        by_age.sort();

        let evicted: Vec<String> = by_age
            .into_iter()
            .take(excess as usize)
            .map(|(_, locator)| locator)
            .collect();

        for locator in &evicted {
            entries.remove(locator);
        }
        Ok(evicted)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> io::Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn entry(locator: &str, stored_at: DateTime<Utc>, validity: Duration) -> CacheEntry {
        CacheEntry::with_stored_at(locator, Bytes::from_static(b"x"), stored_at, validity)
    }

    #[tokio::test]
    async fn test_lookup_absent_is_none() {
        let store = MemoryStore::new();
        assert!(store.lookup("https://a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store
            .upsert(CacheEntry::with_stored_at(
                "https://a",
                Bytes::from_static(b"one"),
                now,
                Duration::from_secs(60),
            ))
            .await
            .unwrap();
        store
            .upsert(CacheEntry::with_stored_at(
                "https://a",
                Bytes::from_static(b"two"),
                now,
                Duration::from_secs(60),
            ))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.lookup("https://a").await.unwrap().unwrap();
        assert_eq!(found.payload.as_ref(), b"two");
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let store = MemoryStore::new();
        store.delete("https://missing").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_evict_oldest_order() {
        let store = MemoryStore::new();
        let base = Utc::now();
        let validity = Duration::from_secs(3600);

        store
            .upsert(entry("https://b", base + ChronoDuration::seconds(2), validity))
            .await
            .unwrap();
        store
            .upsert(entry("https://a", base + ChronoDuration::seconds(1), validity))
            .await
            .unwrap();
        store
            .upsert(entry("https://c", base + ChronoDuration::seconds(3), validity))
            .await
            .unwrap();

        let evicted = store.evict_oldest(2).await.unwrap();
        assert_eq!(evicted, vec!["https://a".to_string(), "https://b".to_string()]);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.lookup("https://c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_evict_oldest_tie_broken_by_locator() {
        let store = MemoryStore::new();
        let base = Utc::now();
        let validity = Duration::from_secs(3600);

        store.upsert(entry("https://z", base, validity)).await.unwrap();
        store.upsert(entry("https://a", base, validity)).await.unwrap();

        let evicted = store.evict_oldest(1).await.unwrap();
        assert_eq!(evicted, vec!["https://a".to_string()]);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        let base = Utc::now();

        store
            .upsert(entry("https://stale", base, Duration::ZERO))
            .await
            .unwrap();
        store
            .upsert(entry("https://fresh", base, Duration::from_secs(3600)))
            .await
            .unwrap();

        let removed = store.purge_expired(base).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.lookup("https://stale").await.unwrap().is_none());
        assert!(store.lookup("https://fresh").await.unwrap().is_some());
    }
}
