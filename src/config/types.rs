use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default number of simultaneous network requests
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Raw scan options as read from a TOML file or the command line
///
/// These are unvalidated; [`ScanOptions::into_policy`] turns them into a
/// [`ScanPolicy`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScanOptions {
    /// The URL to scan
    #[serde(default)]
    pub url: Option<String>,

    /// Report from an earlier run; only its pages are rechecked
    #[serde(default)]
    pub past_result_file: Option<PathBuf>,

    /// Comma separated HTTP status codes treated as healthy
    #[serde(default)]
    pub ignore_status: Option<String>,

    /// Do not validate TLS certificates
    #[serde(default)]
    pub insecure: bool,

    /// Log every failing link while scanning
    #[serde(default)]
    pub verbose: bool,

    /// Upper bound on simultaneous network requests
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,

    /// Location of the response cache file
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// Disable the response cache entirely
    #[serde(default)]
    pub no_cache: bool,
}

/// How the scan picks the pages it parses
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Crawl everything reachable below the seed URL
    #[default]
    FullCrawl,

    /// Only re-verify the given pages; every link they hold is external
    RecheckSeeds(BTreeSet<String>),
}

/// Validated scan policy
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    /// Status codes treated as healthy, each in [100, 511]
    pub ignore_statuses: BTreeSet<u16>,

    /// Skip TLS certificate validation
    pub insecure_tls: bool,

    /// Log every failing link; never changes the report
    pub verbose: bool,

    /// Full crawl or recheck of past pages
    pub mode: ScanMode,

    /// Upper bound on simultaneous network requests
    pub max_concurrent_requests: usize,

    /// Response cache location; None disables the cache
    pub cache_file: Option<PathBuf>,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            ignore_statuses: BTreeSet::new(),
            insecure_tls: false,
            verbose: false,
            mode: ScanMode::FullCrawl,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            cache_file: None,
        }
    }
}

impl ScanPolicy {
    /// Returns true if this policy rechecks pages from a past report
    pub fn is_recheck(&self) -> bool {
        matches!(self.mode, ScanMode::RecheckSeeds(_))
    }
}
