//! URL handling module
//!
//! This module provides URL canonicalization (the frontier and report key)
//! and the crawl scope that decides which pages may be parsed.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{canonical_string, canonicalize, normalize_url};
pub use scope::CrawlScope;
