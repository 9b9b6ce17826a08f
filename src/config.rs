//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold (0 = unbounded)
    pub capacity: u64,
    /// Root directory for the persistent store
    pub cache_dir: PathBuf,
    /// Validity window in seconds applied when a fetch carries no expiry hint
    pub default_validity: u64,
    /// Background stale-entry sweep interval in seconds
    pub sweep_interval: u64,
    /// Per-request HTTP timeout in seconds
    pub request_timeout: u64,
    /// User-Agent header sent with every fetch
    pub user_agent: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries, 0 for unbounded (default: 1000)
    /// - `CACHE_DIR` - Store directory (default: `<system temp>/asset-cache`)
    /// - `DEFAULT_VALIDITY` - Fallback validity window in seconds (default: 3600)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `REQUEST_TIMEOUT` - HTTP timeout in seconds (default: 30)
    /// - `USER_AGENT` - HTTP User-Agent (default: `asset-cache/<version>`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            default_validity: env::var("DEFAULT_VALIDITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_validity),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            cache_dir: env::temp_dir().join("asset-cache"),
            default_validity: 3600,
            sweep_interval: 60,
            request_timeout: 30,
            user_agent: format!("asset-cache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
