//! State module for tracking scan progress
//!
//! # Components
//!
//! - `LinkState`: The state of an individual link (in flight or resolved)
//! - `Frontier`: The per-run dedup table guaranteeing one fetch per URL

mod frontier;
mod link_state;

// Re-export main types
pub use frontier::Frontier;
pub use link_state::{is_error_code, LinkState};
