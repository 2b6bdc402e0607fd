//! Units of work exchanged between the coordinator and the scanners

use crate::STATUS_BAD_LINK;

/// What kind of element referenced a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// An anchor or a crawl root; fetched with GET and parsed if eligible
    Page,
    /// An image; checked with HEAD and never parsed
    Image,
}

/// A link waiting to be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    /// Canonical absolute URL, or the raw value for a malformed link
    pub url: String,

    /// The page that referenced this link; None for a crawl root
    pub parent: Option<String>,

    pub kind: LinkKind,

    /// True if the link is outside the crawl scope and must not be parsed
    pub external: bool,

    /// Terminal status known before any request is made
    pub status_hint: Option<(u16, String)>,
}

impl LinkTask {
    /// Creates a crawl root task; roots are always parsed when healthy
    pub fn root(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent: None,
            kind: LinkKind::Page,
            external: false,
            status_hint: None,
        }
    }

    /// Creates a task for a link discovered on `parent`
    pub fn child(
        url: impl Into<String>,
        parent: impl Into<String>,
        kind: LinkKind,
        external: bool,
    ) -> Self {
        Self {
            url: url.into(),
            parent: Some(parent.into()),
            kind,
            external,
            status_hint: None,
        }
    }

    /// Creates an already-resolved task for a link that could not be parsed
    pub fn malformed(
        raw: impl Into<String>,
        parent: impl Into<String>,
        kind: LinkKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: raw.into(),
            parent: Some(parent.into()),
            kind,
            external: true,
            status_hint: Some((STATUS_BAD_LINK, error.into())),
        }
    }

    /// Returns true if this task has no referencing page
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns true if the body of this link may be parsed for more links
    pub fn is_parseable(&self) -> bool {
        self.kind == LinkKind::Page && !self.external
    }
}

/// Everything a scanner learned from one task
#[derive(Debug, Clone)]
pub struct ScanBatch {
    /// The task that was executed
    pub task: LinkTask,

    /// Terminal status: an HTTP code or 700 for a bad link
    pub code: u16,

    /// Failure text for bad links
    pub error: Option<String>,

    /// Payload size reported by the server, if any
    pub size: u64,

    /// True if the body was parsed
    pub parsed: bool,

    /// Links discovered on the page, deduplicated, in document order
    pub children: Vec<LinkTask>,
}

impl ScanBatch {
    /// Creates a batch for a task that was resolved without expansion
    pub fn finalized(task: LinkTask, code: u16, error: Option<String>) -> Self {
        Self {
            task,
            code,
            error,
            size: 0,
            parsed: false,
            children: Vec::new(),
        }
    }

    /// Returns true if the task failed below the HTTP layer
    pub fn is_bad_link(&self) -> bool {
        self.code == STATUS_BAD_LINK
    }
}
