//! Deadlink-Scout: a concurrent broken-link scanner
//!
//! This crate crawls a website from a single seed URL, checks every anchor and
//! image it references, and reports the links that are unreachable or answer
//! with an HTTP error, grouped by the page that referenced them.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Sentinel status for links that cannot be parsed or fail below the HTTP layer
pub const STATUS_BAD_LINK: u16 = 700;

/// Main error type for scan operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed {url} is unreachable: {message}")]
    SeedUnreachable { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL {0:?}")]
    InvalidUrl(String),

    #[error("Invalid status code {0:?}")]
    InvalidStatus(String),

    #[error("Unknown status code {0:?}")]
    UnknownStatus(String),

    #[error("Failed to load past result {path}: {source}")]
    PastResult {
        path: String,
        source: serde_json::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ScanMode, ScanOptions, ScanPolicy};
pub use crawler::scan;
pub use output::{Broken, ScanReport};
pub use crate::url::normalize_url;
