use crate::url::normalize::canonical_string;
use url::{Origin, Url};

/// The part of a site that a scan is allowed to parse
///
/// A link is internal when it shares the seed's origin (scheme, host and
/// port) and is the seed itself or lies below the seed's path. Everything
/// else is external: status-checked, never parsed. In recheck mode every
/// discovered link is external.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    seed: Url,
    origin: Origin,
    prefix: String,
    force_external: bool,
}

impl CrawlScope {
    /// Creates a scope rooted at the given (normalized) seed URL
    pub fn new(seed: Url, force_external: bool) -> Self {
        let origin = seed.origin();
        let prefix = canonical_string(&seed);
        Self {
            seed,
            origin,
            prefix,
            force_external,
        }
    }

    /// The seed URL this scope was built from
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// The seed's scheme and authority with an empty path, e.g. `http://host:8080/`
    ///
    /// Root-relative references (`/path`) are resolved against this.
    pub fn origin_base(&self) -> Url {
        let mut base = self.seed.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        base
    }

    /// Returns true if every discovered link is treated as external
    pub fn forces_external(&self) -> bool {
        self.force_external
    }

    /// Returns true if the URL must not be parsed for further links
    ///
    /// # Examples
    ///
    /// ```
    /// use deadlink_scout::url::CrawlScope;
    /// use url::Url;
    ///
    /// let scope = CrawlScope::new(Url::parse("http://host/docs").unwrap(), false);
    /// assert!(!scope.is_external(&Url::parse("http://host/docs/intro").unwrap()));
    /// assert!(scope.is_external(&Url::parse("http://host/blog").unwrap()));
    /// assert!(scope.is_external(&Url::parse("http://other/docs").unwrap()));
    /// ```
    pub fn is_external(&self, url: &Url) -> bool {
        if self.force_external {
            return true;
        }
        if url.origin() != self.origin {
            return true;
        }
        !self.contains(&canonical_string(url))
    }

    /// Returns true if the canonical URL string is the seed or lies below it
    fn contains(&self, canonical: &str) -> bool {
        match canonical.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}
