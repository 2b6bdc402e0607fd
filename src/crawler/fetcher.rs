//! HTTP fetcher implementation
//!
//! This module handles all network I/O for the scanner:
//! - Building the shared HTTP client
//! - HEAD requests for images, GET requests for everything else
//! - Retrying DNS lookups that time out
//! - Classifying transport failures as bad links

use crate::config::ScanPolicy;
use crate::crawler::task::LinkKind;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Response};
use std::error::Error as StdError;
use std::time::Duration;

/// Attempts made for a request whose DNS lookup keeps timing out
pub const MAX_DNS_ATTEMPTS: u32 = 5;

/// Delay added per failed DNS attempt
const DNS_RETRY_STEP: Duration = Duration::from_millis(200);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered; the status may still be an HTTP error
    Fetched(Response),

    /// The request failed below the HTTP layer
    BadLink {
        /// Failure description, never empty
        error: String,
    },
}

/// Builds the HTTP client shared by every scanner in a run
///
/// # Arguments
///
/// * `policy` - The scan policy; only `insecure_tls` is read
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use deadlink_scout::config::ScanPolicy;
/// use deadlink_scout::crawler::build_http_client;
///
/// let client = build_http_client(&ScanPolicy::default()).unwrap();
/// ```
pub fn build_http_client(policy: &ScanPolicy) -> Result<Client, reqwest::Error> {
    client_builder(policy).build()
}

fn client_builder(policy: &ScanPolicy) -> ClientBuilder {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(100)
        .tcp_keepalive(Duration::from_secs(30))
        .danger_accept_invalid_certs(policy.insecure_tls)
        .gzip(true)
        .brotli(true)
}

/// Fetches a URL, retrying only when DNS resolution times out
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Response received (any status) | Return `Fetched` |
/// | DNS lookup timed out | Retry, up to 5 attempts, linear back-off |
/// | Any other transport failure | Immediate `BadLink` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `kind` - Images are requested with HEAD, everything else with GET
pub async fn fetch_url(client: &Client, url: &str, kind: LinkKind) -> FetchResult {
    let mut attempt = 1;

    loop {
        let request = match kind {
            LinkKind::Image => client.head(url),
            LinkKind::Page => client.get(url),
        };
        tracing::debug!("{} {} (attempt {})", method_name(kind), url, attempt);

        match request.send().await {
            Ok(response) => return FetchResult::Fetched(response),
            Err(e) if attempt < MAX_DNS_ATTEMPTS && is_dns_timeout(&e) => {
                tracing::debug!("DNS timeout for {}, retrying: {}", url, e);
                tokio::time::sleep(DNS_RETRY_STEP * attempt).await;
                attempt += 1;
            }
            Err(e) => {
                return FetchResult::BadLink {
                    error: error_text(&e),
                };
            }
        }
    }
}

fn method_name(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Image => "HEAD",
        LinkKind::Page => "GET",
    }
}

/// Returns the Content-Type header of a response, if present and readable
pub fn content_type(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

/// Returns the payload size announced by the server, or 0
pub fn content_length(response: &Response) -> u64 {
    response
        .content_length()
        .or_else(|| {
            response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(0)
}

/// Returns true if a body with this content type should be parsed as HTML
///
/// A missing header is treated as HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let mime = value.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("text/html")
                || mime.eq_ignore_ascii_case("application/xhtml+xml")
        }
    }
}

/// Returns true if the error chain shows a DNS lookup that timed out
pub fn is_dns_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut dns = false;
    let mut timeout = false;
    let mut current = Some(err);

    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        dns |= text.contains("dns error") || text.contains("failed to lookup address");
        timeout |= text.contains("timed out")
            || text.contains("temporary failure in name resolution")
            || e.downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut);
        current = e.source();
    }

    dns && timeout
}

/// Flattens an error and its sources into one line
fn error_text(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut current = err.source();

    while let Some(e) = current {
        let cause = e.to_string();
        if !text.contains(&cause) {
            text.push_str(": ");
            text.push_str(&cause);
        }
        current = e.source();
    }

    if text.is_empty() {
        text.push_str("request failed");
    }
    text
}
