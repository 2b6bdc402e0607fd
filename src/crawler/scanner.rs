//! Per-task executor
//!
//! A scanner fetches one link, decides whether its body may be parsed, and
//! hands everything it learned back to the coordinator as a single
//! [`ScanBatch`]. Scanners never touch the frontier or the report.

use crate::config::ScanPolicy;
use crate::crawler::fetcher::{content_length, content_type, fetch_url, is_html, FetchResult};
use crate::crawler::parser::extract_links;
use crate::crawler::task::{LinkTask, ScanBatch};
use crate::state::is_error_code;
use crate::url::CrawlScope;
use crate::STATUS_BAD_LINK;
use reqwest::Client;
use std::collections::BTreeSet;
use tokio::sync::Semaphore;
use url::Url;

/// Read-only state shared by every scanner of a run
#[derive(Debug)]
pub struct ScanContext {
    pub client: Client,
    pub scope: CrawlScope,
    pub ignore_statuses: BTreeSet<u16>,
    pub verbose: bool,

    /// Bounds the number of simultaneous network requests
    pub limiter: Semaphore,
}

impl ScanContext {
    /// Creates the context for a run
    pub fn new(client: Client, scope: CrawlScope, policy: &ScanPolicy) -> Self {
        Self {
            client,
            scope,
            ignore_statuses: policy.ignore_statuses.clone(),
            verbose: policy.verbose,
            limiter: Semaphore::new(policy.max_concurrent_requests.max(1)),
        }
    }

    /// Returns true if the status code is treated as healthy
    pub fn is_ignored(&self, code: u16) -> bool {
        self.ignore_statuses.contains(&code)
    }
}

/// Executes one link task
///
/// # Flow
///
/// 1. Fetch (HEAD for images, GET otherwise) under the request limiter
/// 2. Transport failures, HTTP errors and ignored codes are finalized
/// 3. Internal HTML pages answering 200 are parsed for child links
///
/// Tasks carrying a `status_hint` are resolved by the coordinator and never
/// reach a scanner.
pub async fn scan_link(ctx: &ScanContext, task: LinkTask) -> ScanBatch {
    let Ok(_permit) = ctx.limiter.acquire().await else {
        return ScanBatch::finalized(
            task,
            STATUS_BAD_LINK,
            Some("request limiter closed".to_string()),
        );
    };

    let response = match fetch_url(&ctx.client, &task.url, task.kind).await {
        FetchResult::Fetched(response) => response,
        FetchResult::BadLink { error } => {
            tracing::debug!("{} failed: {}", task.url, error);
            return ScanBatch::finalized(task, STATUS_BAD_LINK, Some(error));
        }
    };

    let code = response.status().as_u16();
    let size = content_length(&response);
    let mut batch = ScanBatch {
        size,
        ..ScanBatch::finalized(task, code, None)
    };

    if ctx.is_ignored(code) || is_error_code(code) {
        tracing::debug!("{} answered {}", batch.task.url, code);
        return batch;
    }

    if !batch.task.is_parseable() || code != 200 || !is_html(content_type(&response)) {
        return batch;
    }

    let page = match Url::parse(&batch.task.url) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Not parsing {}: {}", batch.task.url, e);
            return batch;
        }
    };

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            batch.code = STATUS_BAD_LINK;
            batch.error = Some(format!("failed to read body: {}", e));
            return batch;
        }
    };

    batch.children = extract_links(&body, &page, &ctx.scope);
    batch.parsed = true;
    tracing::debug!(
        "Parsed {}: {} links found",
        batch.task.url,
        batch.children.len()
    );

    batch
}
