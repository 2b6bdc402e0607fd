//! Run statistics
//!
//! Counters collected by the coordinator while a scan runs and logged once
//! it finishes.

use std::fmt;
use std::time::Duration;

/// Scan statistics summary
#[derive(Debug, Clone, Default)]
pub struct ScanStatistics {
    /// Distinct links seen by the frontier
    pub links_discovered: usize,

    /// Scanner tasks dispatched (one network request each, retries aside)
    pub requests: usize,

    /// Pages whose body was parsed for links
    pub pages_parsed: usize,

    /// External links resolved from the response cache
    pub cache_hits: usize,

    /// Broken entries across all pages
    pub broken_links: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl fmt::Display for ScanStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links discovered, {} requests, {} pages parsed, {} cache hits, {} broken in {:.2}s",
            self.links_discovered,
            self.requests,
            self.pages_parsed,
            self.cache_hits,
            self.broken_links,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Logs the statistics at info level
pub fn log_statistics(stats: &ScanStatistics) {
    tracing::info!("Scan finished: {}", stats);
}
