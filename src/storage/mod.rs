//! Storage module for the cross-run response cache
//!
//! The cache remembers the response code and size of links checked in
//! earlier runs. It is separate from the per-run frontier and is only reached
//! through the [`ResponseCache`] hooks; a scan is correct without it.

mod cache;
mod traits;

pub use cache::{default_cache_path, JsonFileCache};
pub use traits::{CacheError, CacheResult, ResponseCache, ScannedLink};

use std::path::Path;
use std::sync::Arc;

/// Opens the cache at the given path, logging and discarding any failure
///
/// # Arguments
///
/// * `path` - Path to the JSON cache file
///
/// # Returns
///
/// * `Some(cache)` - The loaded (possibly empty) cache
/// * `None` - The cache could not be loaded; the scan runs without it
pub fn open_cache(path: &Path) -> Option<Arc<dyn ResponseCache>> {
    match JsonFileCache::load(path) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            tracing::warn!("Ignoring response cache {}: {}", path.display(), e);
            None
        }
    }
}

/// Flushes the cache, logging any failure
pub fn flush_cache(cache: &dyn ResponseCache) {
    if let Err(e) = cache.flush() {
        tracing::warn!("Failed to save response cache: {}", e);
    }
}
