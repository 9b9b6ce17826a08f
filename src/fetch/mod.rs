//! Fetch Module
//!
//! The network seam of the cache: a fetcher retrieves the bytes for a
//! locator and reports an optional expiry hint derived from response
//! metadata.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

pub use http::HttpFetcher;

// == Fetched Object ==
/// The result of one successful network retrieval.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    /// The object body
    pub payload: Bytes,
    /// How long the response says the object stays fresh. `None` means the
    /// origin gave no usable hint and the cache applies its default window.
    pub expiry_hint: Option<Duration>,
}

// == Fetcher Trait ==
/// Abstract network retrieval for a locator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the object at `locator`, or fails with a transport error.
    async fn fetch(&self, locator: &str) -> Result<FetchedObject, FetchError>;
}
