//! Link state definitions for tracking scan progress
//!
//! A link that is absent from the frontier is unvisited. Once claimed it is
//! in flight until its owning scanner reports a terminal status.

use std::fmt;

/// Represents the current state of a link in the frontier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Link has been claimed by a scanner that has not reported yet
    InFlight,

    /// Link has a terminal status
    Resolved {
        /// HTTP status code, or 700 for a bad link
        code: u16,
        /// Failure text for bad links
        error: Option<String>,
    },
}

#[cfg(test)]
impl LinkState {
    /// Creates a resolved state for an HTTP status code
    pub(crate) fn resolved(code: u16) -> Self {
        Self::Resolved { code, error: None }
    }

    /// Creates a resolved state for a link that failed below the HTTP layer
    pub(crate) fn bad_link(error: impl Into<String>) -> Self {
        Self::Resolved {
            code: crate::STATUS_BAD_LINK,
            error: Some(error.into()),
        }
    }
}

/// Returns true for HTTP error codes and the bad-link sentinel
pub fn is_error_code(code: u16) -> bool {
    code >= 400
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFlight => write!(f, "in_flight"),
            Self::Resolved { code, error: None } => write!(f, "resolved({})", code),
            Self::Resolved {
                code,
                error: Some(error),
            } => write!(f, "resolved({}: {})", code, error),
        }
    }
}
