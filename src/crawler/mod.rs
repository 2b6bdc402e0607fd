//! Crawler module for checking the links of a site
//!
//! This module contains the core scanning logic, including:
//! - HTTP fetching with DNS retry
//! - HTML parsing and link resolution
//! - Per-link scanner tasks
//! - Overall scan coordination

mod coordinator;
mod fetcher;
mod parser;
mod scanner;
mod task;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, is_html, FetchResult, MAX_DNS_ATTEMPTS};
pub use parser::{extract_links, resolve_link, LinkElement, Resolution};
pub use scanner::{scan_link, ScanContext};
pub use task::{LinkKind, LinkTask, ScanBatch};

use crate::config::{validate_seed_url, ScanMode, ScanPolicy};
use crate::output::ScanReport;
use crate::storage::{flush_cache, open_cache};
use crate::url::canonical_string;
use crate::Result;
use std::sync::Arc;

/// Runs a complete scan
///
/// This is the main entry point for scanning a site. It will:
/// 1. Validate the seed URL and pick the crawl roots
/// 2. Load the response cache, if one is configured
/// 3. Fetch and parse pages, checking every link they reference
/// 4. Flush the response cache
///
/// # Arguments
///
/// * `seed_url` - Absolute HTTP(S) URL the scan starts from
/// * `policy` - The validated scan policy
///
/// # Returns
///
/// * `Ok(ScanReport)` - Broken links grouped by the page referencing them
/// * `Err(ScanError)` - Invalid configuration, unreachable seed, or client failure
///
/// # Example
///
/// ```no_run
/// use deadlink_scout::{scan, ScanPolicy};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = scan("http://127.0.0.1:8080", ScanPolicy::default()).await?;
/// println!("{}", report.to_json_pretty()?);
/// # Ok(())
/// # }
/// ```
pub async fn scan(seed_url: &str, policy: ScanPolicy) -> Result<ScanReport> {
    let seed = validate_seed_url(seed_url)?;

    let roots = match &policy.mode {
        ScanMode::FullCrawl => vec![LinkTask::root(canonical_string(&seed))],
        ScanMode::RecheckSeeds(pages) => pages
            .iter()
            .map(|page| validate_seed_url(page).map(|url| LinkTask::root(canonical_string(&url))))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    let cache = policy.cache_file.as_deref().and_then(open_cache);

    let mut coordinator = Coordinator::new(seed, &policy)?;
    if let Some(cache) = &cache {
        coordinator = coordinator.with_cache(Arc::clone(cache));
    }

    let report = coordinator.run(roots).await;

    if let Some(cache) = &cache {
        flush_cache(cache.as_ref());
    }

    report
}
