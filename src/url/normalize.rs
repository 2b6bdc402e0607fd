use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL according to the scanner's canonicalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Only HTTP and HTTPS are accepted
/// 3. The URL must have a host
/// 4. Remove fragment (everything after #)
/// 5. Remove trailing slashes from the path (the root path stays `/`)
///
/// Host lowercasing and dot-segment removal are done by the parser itself.
/// Query strings are left untouched since they are part of what gets fetched.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use deadlink_scout::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/page/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(strip_url(url))
}

/// Returns the canonical string form of a URL
///
/// This is the key used by the frontier and the report. It is the normalized
/// URL without the lone `/` that the URL serializer appends to a bare origin,
/// so `http://host/` and `http://host` map to the same string.
///
/// # Examples
///
/// ```
/// use deadlink_scout::url::canonical_string;
/// use url::Url;
///
/// let url = Url::parse("http://example.com/").unwrap();
/// assert_eq!(canonical_string(&url), "http://example.com");
/// ```
pub fn canonical_string(url: &Url) -> String {
    let url = strip_url(url.clone());
    let serialized = url.to_string();

    if url.path() == "/" && url.query().is_none() {
        match serialized.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => serialized,
        }
    } else {
        serialized
    }
}

/// Parses and canonicalizes a URL string in one step
pub fn canonicalize(url_str: &str) -> UrlResult<String> {
    normalize_url(url_str).map(|url| canonical_string(&url))
}

fn strip_url(mut url: Url) -> Url {
    url.set_fragment(None);
    let path = normalize_path(url.path());
    url.set_path(&path);
    url
}

/// Removes trailing slashes from a path, keeping the root `/`
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
