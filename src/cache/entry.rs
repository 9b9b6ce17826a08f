//! Cache Entry Module
//!
//! Defines the stored record for one locator: payload plus validity window.

use bytes::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

// == Cache Entry ==
/// The stored record for a single locator.
///
/// Entries are immutable once written: a re-fetch replaces the whole record,
/// never part of it. The invariant `expires_at >= stored_at` always holds;
/// a zero-length validity window is legal but means the entry is stale the
/// moment it lands.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The locator (URL string) this entry belongs to
    pub locator: String,
    /// The cached object body
    pub payload: Bytes,
    /// Insertion time
    pub stored_at: DateTime<Utc>,
    /// Staleness boundary
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stored now and valid for `validity`.
    ///
    /// Validity windows too large for the timestamp arithmetic are clamped
    /// to the maximum chrono can represent, so a caller passing
    /// `Duration::MAX` gets an effectively immortal entry rather than a panic.
    pub fn new(locator: impl Into<String>, payload: Bytes, validity: Duration) -> Self {
        let now = Utc::now();
        Self::with_stored_at(locator, payload, now, validity)
    }

    /// Creates an entry with an explicit insertion time.
    ///
    /// Used by stores when rehydrating from disk and by tests that need
    /// deterministic timestamps.
    pub fn with_stored_at(
        locator: impl Into<String>,
        payload: Bytes,
        stored_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        let window = ChronoDuration::from_std(validity).unwrap_or(ChronoDuration::MAX);
        let expires_at = stored_at
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            locator: locator.into(),
            payload,
            stored_at,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// Boundary condition: an entry is stale when `now >= expires_at`, so a
    /// zero-validity entry never counts as fresh.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Remaining Validity ==
    /// Returns how long the entry stays fresh from `now`, or zero if stale.
    pub fn remaining_validity(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}
