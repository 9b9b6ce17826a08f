//! File Store Module
//!
//! Durable implementation of the [`Store`] trait: one payload file plus a
//! JSON metadata sidecar per entry, under a root directory created lazily
//! on first use. Entries survive process restarts.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::store::Store;

const PAYLOAD_EXT: &str = "bin";
const META_EXT: &str = "meta";
const TMP_EXT: &str = "tmp";

// == Entry Metadata Sidecar ==
/// On-disk record describing one payload file.
///
/// The sidecar carries the original locator so entries can be rehydrated
/// and evicted by age without reversing the filename hash.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    locator: String,
    stored_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

// == File Store ==
/// Durable entry store: `<sha256(locator)>.bin` payload files with `.meta`
/// sidecars under `root`.
///
/// Writes land in `.tmp` files renamed into place, so concurrent writers
/// for one locator resolve last-writer-wins without torn entries.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    initialized: AtomicBool,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Creates the root directory once, on whichever call gets there first.
    async fn ensure_initialized(&self) -> io::Result<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        fs::create_dir_all(&self.root).await?;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn file_stem(locator: &str) -> String {
        hex::encode(Sha256::digest(locator.as_bytes()))
    }

    fn payload_path(&self, locator: &str) -> PathBuf {
        self.root
            .join(Self::file_stem(locator))
            .with_extension(PAYLOAD_EXT)
    }

    fn meta_path(&self, locator: &str) -> PathBuf {
        self.root
            .join(Self::file_stem(locator))
            .with_extension(META_EXT)
    }

    /// Writes `contents` to `path` via a temp file renamed into place.
    ///
    /// The temp name is unique per write (process id plus a sequence
    /// number), so concurrent writers for one locator each rename their
    /// own complete file: last writer wins, never a torn or stolen entry.
    async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
        static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(format!(
            ".{}.{}.{}",
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed),
            TMP_EXT
        ));
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await
    }

    /// Removes a file, treating an already-absent file as success.
    async fn remove_if_present(path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Reads and parses one sidecar, discarding it if corrupt.
    async fn read_meta(&self, path: &Path) -> io::Result<Option<EntryMeta>> {
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match serde_json::from_slice::<EntryMeta>(&raw) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding corrupt metadata sidecar");
                Self::remove_if_present(path).await?;
                // The payload under the same stem is unreachable without
                // its sidecar, so reclaim it instead of orphaning it
                Self::remove_if_present(&path.with_extension(PAYLOAD_EXT)).await?;
                Ok(None)
            }
        }
    }

    /// Lists every readable sidecar under the root.
    async fn list_metas(&self) -> io::Result<Vec<EntryMeta>> {
        self.ensure_initialized().await?;

        let mut metas = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                continue;
            }
            if let Some(meta) = self.read_meta(&path).await? {
                metas.push(meta);
            }
        }
        Ok(metas)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn lookup(&self, locator: &str) -> io::Result<Option<CacheEntry>> {
        self.ensure_initialized().await?;

        let meta = match self.read_meta(&self.meta_path(locator)).await? {
            Some(meta) => meta,
            None => return Ok(None),
        };

        let payload = match fs::read(self.payload_path(locator)).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Orphaned sidecar: payload gone, drop the record
                warn!(locator, "Payload file missing for stored entry, discarding");
                Self::remove_if_present(&self.meta_path(locator)).await?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(Some(CacheEntry {
            locator: meta.locator,
            payload,
            stored_at: meta.stored_at,
            expires_at: meta.expires_at,
        }))
    }

    async fn upsert(&self, entry: CacheEntry) -> io::Result<()> {
        self.ensure_initialized().await?;

        let meta = EntryMeta {
            locator: entry.locator.clone(),
            stored_at: entry.stored_at,
            expires_at: entry.expires_at,
        };
        let meta_json = serde_json::to_vec(&meta)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Payload first: a reader that sees the sidecar must find the bytes
        Self::write_atomic(&self.payload_path(&entry.locator), &entry.payload).await?;
        Self::write_atomic(&self.meta_path(&entry.locator), &meta_json).await?;

        debug!(locator = %entry.locator, bytes = entry.payload.len(), "Stored entry");
        Ok(())
    }

    async fn delete(&self, locator: &str) -> io::Result<()> {
        self.ensure_initialized().await?;

        // Sidecar first so a half-deleted entry reads as absent
        Self::remove_if_present(&self.meta_path(locator)).await?;
        Self::remove_if_present(&self.payload_path(locator)).await
    }

    async fn delete_all(&self) -> io::Result<()> {
        self.ensure_initialized().await?;

        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(dirent) = dir.next_entry().await? {
            let path = dirent.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some(META_EXT) | Some(PAYLOAD_EXT) | Some(TMP_EXT)) {
                Self::remove_if_present(&path).await?;
            }
        }
        Ok(())
    }

    async fn count(&self) -> io::Result<u64> {
        Ok(self.list_metas().await?.len() as u64)
    }

    async fn evict_oldest(&self, excess: u64) -> io::Result<Vec<String>> {
        let mut metas = self.list_metas().await?;
        metas.sort_by(|a, b| {
            a.stored_at
                .cmp(&b.stored_at)
                .then_with(|| a.locator.cmp(&b.locator))
        });

        let mut evicted = Vec::new();
        for meta in metas.into_iter().take(excess as usize) {
            self.delete(&meta.locator).await?;
            evicted.push(meta.locator);
        }
        Ok(evicted)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> io::Result<u64> {
        let mut removed = 0;
        for meta in self.list_metas().await? {
            if meta.expires_at <= now {
                self.delete(&meta.locator).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
