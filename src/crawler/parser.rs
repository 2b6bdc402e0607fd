//! HTML parser for extracting links to check
//!
//! Every `<a href>` and `<img src>` of a page becomes one [`LinkTask`], in
//! document order, resolved against the page and the crawl scope.

use crate::crawler::task::{LinkKind, LinkTask};
use crate::url::{canonical_string, CrawlScope};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// The elements whose references are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkElement {
    Anchor,
    Image,
}

impl LinkElement {
    fn from_element(element: &ElementRef<'_>) -> Option<Self> {
        match element.value().name() {
            "a" => Some(Self::Anchor),
            "img" => Some(Self::Image),
            _ => None,
        }
    }

    /// The attribute holding the reference
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Anchor => "href",
            Self::Image => "src",
        }
    }

    /// How the referenced link is fetched
    pub fn kind(self) -> LinkKind {
        match self {
            Self::Anchor => LinkKind::Page,
            Self::Image => LinkKind::Image,
        }
    }
}

/// Outcome of resolving one attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An absolute, normalized HTTP(S) URL
    Link(Url),

    /// An HTTP(S) reference that could not be parsed
    Malformed {
        raw: String,
        error: String,
    },
}

/// Parses a page and returns the links it references
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page` - The URL the content was fetched from
/// * `scope` - The crawl scope, used for root-relative links and externality
///
/// # Returns
///
/// One task per distinct link, first occurrence wins.
///
/// # Example
///
/// ```
/// use deadlink_scout::crawler::extract_links;
/// use deadlink_scout::url::CrawlScope;
/// use url::Url;
///
/// let seed = Url::parse("http://example.com").unwrap();
/// let scope = CrawlScope::new(seed.clone(), false);
/// let html = r#"<a href="/about">About</a><img src="logo.png">"#;
///
/// let tasks = extract_links(html, &seed, &scope);
/// assert_eq!(tasks[0].url, "http://example.com/about");
/// assert_eq!(tasks[1].url, "http://example.com/logo.png");
/// ```
pub fn extract_links(html: &str, page: &Url, scope: &CrawlScope) -> Vec<LinkTask> {
    let Ok(selector) = Selector::parse("a[href], img[src]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let parent = canonical_string(page);
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for element in document.select(&selector) {
        let Some(link_element) = LinkElement::from_element(&element) else {
            continue;
        };
        let Some(value) = element.value().attr(link_element.attribute()) else {
            continue;
        };

        let task = match resolve_link(value, link_element, page, scope) {
            Some(Resolution::Link(url)) => {
                let external = scope.is_external(&url);
                LinkTask::child(canonical_string(&url), &parent, link_element.kind(), external)
            }
            Some(Resolution::Malformed { raw, error }) => {
                LinkTask::malformed(raw, &parent, link_element.kind(), error)
            }
            None => continue,
        };

        if seen.insert(task.url.clone()) {
            tasks.push(task);
        } else {
            tracing::trace!("Skipping duplicate link {} on {}", task.url, parent);
        }
    }

    tasks
}

/// Resolves an attribute value to a link
///
/// Returns None if the value must be skipped:
/// - empty values
/// - same-page anchors (`#section`)
/// - non-HTTP schemes such as `mailto:`, `javascript:`, `tel:` or `data:`
pub fn resolve_link(
    value: &str,
    element: LinkElement,
    page: &Url,
    scope: &CrawlScope,
) -> Option<Resolution> {
    let value = value.trim();

    if value.is_empty() {
        return None;
    }

    if element == LinkElement::Anchor && value.starts_with('#') {
        return None;
    }

    let resolved = if let Some(scheme) = explicit_scheme(value) {
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return None;
        }
        Url::parse(value)
    } else if value.starts_with("//") {
        Url::parse(&format!("{}:{}", scope.seed().scheme(), value))
    } else if value.starts_with('/') {
        scope.origin_base().join(value)
    } else {
        as_directory(page).join(value)
    };

    match resolved {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Some(Resolution::Link(url)),
        Ok(url) => Some(Resolution::Malformed {
            raw: value.to_string(),
            error: format!("missing host in URL {}", url),
        }),
        Err(e) => Some(Resolution::Malformed {
            raw: value.to_string(),
            error: e.to_string(),
        }),
    }
}

/// Returns the scheme of a value like `mailto:x`, if it has one
fn explicit_scheme(value: &str) -> Option<&str> {
    let (scheme, _) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;

    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(scheme)
    } else {
        None
    }
}

/// Treats the page URL as a directory for relative resolution
///
/// The page's query and fragment are dropped; those of the relative value
/// survive the join.
fn as_directory(page: &Url) -> Url {
    let mut base = page.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}
