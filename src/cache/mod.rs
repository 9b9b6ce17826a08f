//! Cache Module
//!
//! The cache orchestration core: entry model, statistics, and the
//! cache-or-fetch decision logic over an abstract store and fetcher.

mod entry;
mod object_cache;
mod shared;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use object_cache::{CachedObject, ObjectCache, ObjectSource};
pub use shared::shared_cache;
pub use stats::{CacheStats, StatsSnapshot};

// == Public Constants ==
/// Maximum allowed locator length in bytes
pub const MAX_LOCATOR_LENGTH: usize = 2048;
