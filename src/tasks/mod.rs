//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is live.
//!
//! # Tasks
//! - Stale-entry sweep: reclaims expired entries at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
