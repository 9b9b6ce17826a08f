//! Asset Cache demo binary
//!
//! Fetches the URLs given on the command line through the shared cache,
//! reporting for each whether it was served from disk or the network,
//! then prints the accumulated statistics.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Initialize the shared cache (FileStore + HttpFetcher)
//! 4. Start the background stale-entry sweep task
//! 5. Resolve each URL argument through the cache
//! 6. Print statistics and stop the sweep task

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asset_cache::{shared_cache, spawn_sweep_task, Config, ObjectSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let locators: Vec<String> = std::env::args().skip(1).collect();
    if locators.is_empty() {
        anyhow::bail!("Usage: asset-cache <url> [<url> ...]");
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, cache_dir={}, default_validity={}s, sweep_interval={}s",
        config.capacity,
        config.cache_dir.display(),
        config.default_validity,
        config.sweep_interval
    );

    let cache = shared_cache();
    let sweep_handle = spawn_sweep_task(cache.clone(), config.sweep_interval);

    for locator in &locators {
        let got = cache
            .request(locator)
            .await
            .with_context(|| format!("Failed to resolve {locator}"))?;
        let source = match got.source {
            ObjectSource::Cache => "cache",
            ObjectSource::Network => "network",
        };
        info!("{locator}: {} bytes from {source}", got.payload.len());
    }

    cache.print_statistics();
    info!("{} entries stored", cache.count().await?);

    sweep_handle.abort();
    Ok(())
}
