//! Error types for the object cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Every failure a caller can observe funnels through this enum: a locator
/// rejected before any async work starts, a persistence failure from the
/// store, or a transport failure from the fetcher.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Locator rejected synchronously (empty, oversized, or not a parseable URL)
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Persistence I/O failure from the underlying store
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Network fetch failed; the store was not modified
    #[error("Fetch failed for {locator}: {source}")]
    Fetch {
        locator: String,
        source: FetchError,
    },
}

// == Fetch Error Enum ==
/// Transport-level failure surfaced verbatim from the fetcher.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout, or protocol failure from the HTTP client
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
