//! Cache traits and error types
//!
//! This module defines the interface the coordinator uses to talk to a
//! cross-run response cache, and the errors a cache backend may report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during cache operations
///
/// These never abort a scan; the caller logs them and carries on.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No cache directory available on this platform")]
    NoCacheDir,
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// A link remembered from a previous run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedLink {
    pub url: String,
    pub size: u64,
    pub response_code: u16,
}

/// Trait for cross-run response caches
///
/// Implementations must be safe to share between the coordinator and the
/// code that flushes the cache once the run ends.
pub trait ResponseCache: Send + Sync {
    /// Looks up a link by its canonical URL
    fn get(&self, url: &str) -> Option<ScannedLink>;

    /// Remembers the response of a link
    ///
    /// A fresh response replaces any entry stored for the same URL.
    fn set(&self, url: &str, response_code: u16, size: u64);

    /// Persists the cache
    fn flush(&self) -> CacheResult<()>;
}
