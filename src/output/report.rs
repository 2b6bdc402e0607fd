//! Broken-link report and its builder
//!
//! The serialized form is
//!
//! ```json
//! {"broken_links": {"<page-url>": [{"link": "...", "error": "...", "code": 404}]}}
//! ```
//!
//! with `error` omitted when absent and each page's list sorted by link.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A broken link found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broken {
    /// The referenced URL (canonical, or the raw value if it did not parse)
    pub link: String,

    /// Failure text for links that failed below the HTTP layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// HTTP status code, or 700 for a bad link
    pub code: u16,
}

/// Result of a scan: broken links grouped by the page that referenced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Page URL to its broken links
    #[serde(default)]
    pub broken_links: BTreeMap<String, Vec<Broken>>,
}

impl ScanReport {
    /// Loads a previously produced report from a JSON file
    ///
    /// The file is only read, never written back.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::PastResult {
            path: path.display().to_string(),
            source,
        })
    }

    /// Returns true if no broken link was found
    pub fn is_empty(&self) -> bool {
        self.broken_links.is_empty()
    }

    /// Total number of broken entries across all pages
    pub fn broken_count(&self) -> usize {
        self.broken_links.values().map(Vec::len).sum()
    }

    /// Serializes the report as indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Accumulates broken entries during a scan and finalizes the report
#[derive(Debug, Default)]
pub struct ReportBuilder {
    broken_links: BTreeMap<String, Vec<Broken>>,
}

impl ReportBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a broken entry under the page that referenced it
    pub fn add(&mut self, page: &str, broken: Broken) {
        tracing::debug!(
            "Broken link on {}: {} ({})",
            page,
            broken.link,
            broken.code
        );
        self.broken_links
            .entry(page.to_string())
            .or_default()
            .push(broken);
    }

    /// Number of broken entries recorded so far
    pub fn len(&self) -> usize {
        self.broken_links.values().map(Vec::len).sum()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.broken_links.is_empty()
    }

    /// Sorts every page's entries by link and returns the report
    pub fn finish(mut self) -> ScanReport {
        for list in self.broken_links.values_mut() {
            list.sort_by(|a, b| a.link.cmp(&b.link));
        }
        ScanReport {
            broken_links: self.broken_links,
        }
    }
}
