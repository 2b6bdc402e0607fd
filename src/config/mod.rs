//! Configuration module
//!
//! This module turns raw scan options (from a TOML file, the command line, or
//! both) into a validated [`ScanPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use deadlink_scout::config::load_options;
//! use std::path::Path;
//!
//! let options = load_options(Path::new("scout.toml")).unwrap();
//! let policy = options.into_policy().unwrap();
//! println!("Ignoring: {:?}", policy.ignore_statuses);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ScanMode, ScanOptions, ScanPolicy, DEFAULT_MAX_CONCURRENT_REQUESTS};

// Re-export parser and validation functions
pub use parser::{load_options, load_recheck_seeds, parse_ignore_status};
pub use validation::{validate_seed_url, MAX_STATUS_CODE, MIN_STATUS_CODE};
