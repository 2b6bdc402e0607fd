//! Output module for scan results
//!
//! This module handles:
//! - Accumulating broken links per page and finalizing the sorted report
//! - Loading a past report for recheck runs
//! - Recording scan statistics

mod report;
pub mod stats;

pub use report::{Broken, ReportBuilder, ScanReport};
pub use stats::{log_statistics, ScanStatistics};
