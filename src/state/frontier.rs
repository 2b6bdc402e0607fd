//! Deduplicating frontier for a single scan run
//!
//! The frontier maps every canonical URL seen during a run to its
//! [`LinkState`]. All reads and writes go through one mutex, so a claim is
//! atomic with respect to concurrent discoveries of the same URL: exactly one
//! caller wins [`Frontier::try_claim`] and becomes the owning fetcher, every
//! other caller observes the link as in flight or resolved.
//!
//! The number of claimed-but-unresolved links is kept under the same lock and
//! is what the coordinator uses to detect quiescence.

use crate::state::LinkState;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FrontierInner {
    links: HashMap<String, LinkState>,
    in_flight: usize,
}

/// Dedup and status table over all URLs discovered in a run
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Transitions an unvisited URL to in flight
    ///
    /// Returns true only to the caller that becomes the owning fetcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlink_scout::state::Frontier;
    ///
    /// let frontier = Frontier::new();
    /// assert!(frontier.try_claim("http://host/page"));
    /// assert!(!frontier.try_claim("http://host/page"));
    /// ```
    pub fn try_claim(&self, url: &str) -> bool {
        let mut inner = self.lock();
        if inner.links.contains_key(url) {
            return false;
        }
        inner.links.insert(url.to_string(), LinkState::InFlight);
        inner.in_flight += 1;
        true
    }

    /// Records the terminal status of a claimed URL
    ///
    /// Recording the same URL twice keeps the first status. Returns true if
    /// this call performed the in-flight to resolved transition.
    pub fn record(&self, url: &str, code: u16, error: Option<String>) -> bool {
        let mut inner = self.lock();
        let state = LinkState::Resolved { code, error };

        match inner.links.get(url) {
            Some(LinkState::InFlight) => {
                inner.links.insert(url.to_string(), state);
                inner.in_flight -= 1;
                true
            }
            Some(LinkState::Resolved { .. }) => {
                tracing::trace!("{} already resolved, keeping first status", url);
                false
            }
            None => {
                tracing::warn!("Recording status for unclaimed link {}", url);
                inner.links.insert(url.to_string(), state);
                false
            }
        }
    }

    /// Returns the state of a URL, or None if it has not been seen
    pub fn peek(&self, url: &str) -> Option<LinkState> {
        self.lock().links.get(url).cloned()
    }

    /// Number of links claimed but not yet resolved
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct links seen in this run
    pub fn len(&self) -> usize {
        self.lock().links.len()
    }

    /// Returns true if no link has been seen
    pub fn is_empty(&self) -> bool {
        self.lock().links.is_empty()
    }
}
