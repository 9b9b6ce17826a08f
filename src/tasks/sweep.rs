//! Stale-Entry Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! stale payloads get reclaimed even if their locators are never
//! requested again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ObjectCache;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Sweep failures are logged and the loop continues; a
/// transient store error should not kill the task.
///
/// # Arguments
/// * `cache` - Shared cache instance to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_sweep_task(cache: Arc<ObjectCache>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stale-entry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.sweep_expired().await {
                Ok(removed) if removed > 0 => {
                    info!("Sweep: removed {} expired entries", removed);
                }
                Ok(_) => {
                    debug!("Sweep: no expired entries found");
                }
                Err(e) => {
                    warn!("Sweep failed: {}", e);
                }
            }
        }
    })
}
