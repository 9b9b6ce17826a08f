//! HTTP Fetcher Module
//!
//! Retrieves objects over HTTP(S) with reqwest and derives the expiry hint
//! from standard response headers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CACHE_CONTROL, EXPIRES};
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::fetch::{FetchedObject, Fetcher};

// == HTTP Fetcher ==
/// [`Fetcher`] implementation over a shared reqwest client.
///
/// Non-2xx statuses are fetch errors; redirects are followed by the client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured timeout and user agent.
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .build()
            // Fails only if the TLS backend cannot initialize
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedObject, FetchError> {
        let response = self.client.get(locator).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let expiry_hint = expiry_hint_from_headers(response.headers(), Utc::now());
        let payload = response.bytes().await?;

        debug!(
            locator,
            bytes = payload.len(),
            hint_secs = expiry_hint.map(|h| h.as_secs()),
            "Fetched object"
        );

        Ok(FetchedObject {
            payload,
            expiry_hint,
        })
    }
}

// == Expiry Hint Parsing ==
/// Derives the freshness window from response headers.
///
/// Precedence follows HTTP caching semantics: `Cache-Control` directives
/// win over `Expires`. `no-store`/`no-cache` yield a zero hint (the entry
/// is stored but immediately stale), `max-age`/`s-maxage` give the window
/// directly, and an `Expires` date is measured against `now`. Returns
/// `None` when no usable header is present.
fn expiry_hint_from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    if let Some(value) = headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()) {
        if let Some(hint) = parse_cache_control(value) {
            return Some(hint);
        }
    }

    let expires = headers.get(EXPIRES)?.to_str().ok()?;
    let expires = DateTime::parse_from_rfc2822(expires).ok()?;
    // An Expires date in the past means already stale, not "no hint"
    Some((expires.with_timezone(&Utc) - now).to_std().unwrap_or(Duration::ZERO))
}

/// Parses a `Cache-Control` header value into a freshness window.
fn parse_cache_control(value: &str) -> Option<Duration> {
    let mut max_age = None;
    let mut s_maxage = None;

    for directive in value.split(',') {
        let directive = directive.trim();
        let (name, arg) = match directive.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (directive, None),
        };

        match name.to_ascii_lowercase().as_str() {
            "no-store" | "no-cache" => return Some(Duration::ZERO),
            "max-age" => max_age = arg.and_then(|a| a.parse::<u64>().ok()),
            "s-maxage" => s_maxage = arg.and_then(|a| a.parse::<u64>().ok()),
            _ => {}
        }
    }

    // Shared caches prefer s-maxage when both are present
    s_maxage.or(max_age).map(Duration::from_secs)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use reqwest::header::HeaderValue;

    fn headers_with(name: reqwest::header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_max_age() {
        let headers = headers_with(CACHE_CONTROL, "public, max-age=120");
        let hint = expiry_hint_from_headers(&headers, Utc::now());
        assert_eq!(hint, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_s_maxage_wins_over_max_age() {
        let headers = headers_with(CACHE_CONTROL, "max-age=60, s-maxage=600");
        let hint = expiry_hint_from_headers(&headers, Utc::now());
        assert_eq!(hint, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_no_store_yields_zero_hint() {
        let headers = headers_with(CACHE_CONTROL, "no-store");
        let hint = expiry_hint_from_headers(&headers, Utc::now());
        assert_eq!(hint, Some(Duration::ZERO));
    }

    #[test]
    fn test_no_cache_yields_zero_hint() {
        let headers = headers_with(CACHE_CONTROL, "no-cache, max-age=300");
        let hint = expiry_hint_from_headers(&headers, Utc::now());
        assert_eq!(hint, Some(Duration::ZERO));
    }

    #[test]
    fn test_expires_fallback() {
        let now = Utc::now();
        let expires = (now + ChronoDuration::seconds(90)).to_rfc2822();
        let headers = headers_with(EXPIRES, &expires);

        let hint = expiry_hint_from_headers(&headers, now).unwrap();
        // to_rfc2822 truncates sub-second precision
        assert!(hint >= Duration::from_secs(89) && hint <= Duration::from_secs(90));
    }

    #[test]
    fn test_expires_in_the_past_is_zero() {
        let now = Utc::now();
        let expires = (now - ChronoDuration::seconds(90)).to_rfc2822();
        let headers = headers_with(EXPIRES, &expires);

        let hint = expiry_hint_from_headers(&headers, now);
        assert_eq!(hint, Some(Duration::ZERO));
    }

    #[test]
    fn test_cache_control_wins_over_expires() {
        let now = Utc::now();
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=10"));
        let expires = (now + ChronoDuration::seconds(500)).to_rfc2822();
        headers.insert(EXPIRES, HeaderValue::from_str(&expires).unwrap());

        let hint = expiry_hint_from_headers(&headers, now);
        assert_eq!(hint, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_no_headers_means_no_hint() {
        let headers = HeaderMap::new();
        assert_eq!(expiry_hint_from_headers(&headers, Utc::now()), None);
    }

    #[test]
    fn test_malformed_headers_mean_no_hint() {
        let headers = headers_with(CACHE_CONTROL, "max-age=banana");
        assert_eq!(expiry_hint_from_headers(&headers, Utc::now()), None);

        let headers = headers_with(EXPIRES, "not a date");
        assert_eq!(expiry_hint_from_headers(&headers, Utc::now()), None);
    }
}
