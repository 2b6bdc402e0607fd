//! Crawler coordinator - owns the frontier and the report
//!
//! The coordinator is the only place where scan state changes. It:
//! - Seeds the crawl roots
//! - Spawns one scanner task per newly claimed link
//! - Consumes scanner batches as they complete
//! - Attributes broken links to every page that referenced them
//! - Detects completion when no scanner is left running
//!
//! A link discovered while another scanner is still fetching it is parked in
//! a wait-set keyed by URL. Waiters are drained in the same step that records
//! the URL's status, so none can be left behind when the last task finishes.

use crate::config::ScanPolicy;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::scanner::{scan_link, ScanContext};
use crate::crawler::task::{LinkTask, ScanBatch};
use crate::output::{log_statistics, Broken, ReportBuilder, ScanReport, ScanStatistics};
use crate::state::{is_error_code, Frontier, LinkState};
use crate::storage::{ResponseCache, ScannedLink};
use crate::url::CrawlScope;
use crate::{Result, ScanError, STATUS_BAD_LINK};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{Id, JoinError, JoinSet};
use url::Url;

/// Main scan coordinator structure
pub struct Coordinator {
    ctx: Arc<ScanContext>,
    frontier: Frontier,
    report: ReportBuilder,
    cache: Option<Arc<dyn ResponseCache>>,
    tasks: JoinSet<ScanBatch>,
    running: HashMap<Id, LinkTask>,
    waiting: HashMap<String, Vec<LinkTask>>,
    stats: ScanStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The normalized seed URL; it defines the crawl scope
    /// * `policy` - The validated scan policy
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScanError)` - The HTTP client could not be built
    pub fn new(seed: Url, policy: &ScanPolicy) -> Result<Self> {
        let client = build_http_client(policy)?;
        let scope = CrawlScope::new(seed, policy.is_recheck());

        Ok(Self {
            ctx: Arc::new(ScanContext::new(client, scope, policy)),
            frontier: Frontier::new(),
            report: ReportBuilder::new(),
            cache: None,
            tasks: JoinSet::new(),
            running: HashMap::new(),
            waiting: HashMap::new(),
            stats: ScanStatistics::default(),
        })
    }

    /// Attaches a cross-run response cache
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Runs the scan from the given roots until every link is resolved
    ///
    /// # Returns
    ///
    /// * `Ok(ScanReport)` - The broken links, grouped by page
    /// * `Err(ScanError::SeedUnreachable)` - A root failed below the HTTP layer
    pub async fn run(mut self, roots: Vec<LinkTask>) -> Result<ScanReport> {
        let start = Instant::now();
        tracing::info!(
            "Starting scan of {} with {} root(s)",
            self.ctx.scope.seed(),
            roots.len()
        );

        for root in roots {
            if self.frontier.try_claim(&root.url) {
                self.dispatch(root);
            }
        }

        while let Some(joined) = self.tasks.join_next_with_id().await {
            let batch = match joined {
                Ok((id, batch)) => {
                    self.running.remove(&id);
                    batch
                }
                Err(e) => match self.running.remove(&e.id()) {
                    Some(task) => panicked_batch(task, &e),
                    None => {
                        tracing::warn!("Lost track of a failed scanner task: {}", e);
                        continue;
                    }
                },
            };

            self.handle_batch(batch)?;
        }

        debug_assert_eq!(self.frontier.in_flight(), 0);
        if !self.waiting.is_empty() {
            tracing::warn!("{} link(s) left waiting at completion", self.waiting.len());
        }

        self.stats.links_discovered = self.frontier.len();
        self.stats.broken_links = self.report.len();
        self.stats.elapsed = start.elapsed();
        log_statistics(&self.stats);

        Ok(self.report.finish())
    }

    /// Spawns a scanner for a claimed link
    fn dispatch(&mut self, task: LinkTask) {
        tracing::trace!("Dispatching {}", task.url);
        self.stats.requests += 1;

        let ctx = Arc::clone(&self.ctx);
        let spawned = task.clone();
        let handle = self
            .tasks
            .spawn(async move { scan_link(&ctx, spawned).await });
        self.running.insert(handle.id(), task);
    }

    /// Retires one scanner batch
    fn handle_batch(&mut self, batch: ScanBatch) -> Result<()> {
        if batch.parsed {
            self.stats.pages_parsed += 1;
        }
        let bad_link = batch.is_bad_link();

        let ScanBatch {
            task,
            code,
            error,
            size,
            children,
            ..
        } = batch;

        if task.is_root() {
            if bad_link {
                return Err(ScanError::SeedUnreachable {
                    url: task.url,
                    message: error.unwrap_or_default(),
                });
            }
            if is_error_code(code) && !self.ctx.is_ignored(code) {
                tracing::warn!("{} answered with status {}", task.url, code);
            }
        }

        if task.external && !bad_link {
            if let Some(cache) = &self.cache {
                cache.set(&task.url, code, size);
            }
        }

        self.resolve(task, code, error);

        for child in children {
            self.discover(child);
        }

        Ok(())
    }

    /// Records a terminal status and attributes it to the task and its waiters
    fn resolve(&mut self, task: LinkTask, code: u16, error: Option<String>) {
        self.frontier.record(&task.url, code, error.clone());

        let waiters = self.waiting.remove(&task.url).unwrap_or_default();
        self.attribute(&task, code, error.as_deref());
        for waiter in &waiters {
            self.attribute(waiter, code, error.as_deref());
        }
    }

    /// Decides what to do with a link found on a parsed page
    ///
    /// | Frontier state | Action |
    /// |----------------|--------|
    /// | status known up front | Resolve, attribute to this page |
    /// | unvisited | Claim; answer from cache or dispatch a scanner |
    ///
    /// The cache is never read in recheck mode; every link of a rechecked
    /// page is fetched again.
    /// | resolved | Attribute to this page if broken |
    /// | in flight | Park in the wait-set |
    fn discover(&mut self, child: LinkTask) {
        if let Some((code, error)) = child.status_hint.clone() {
            if self.frontier.try_claim(&child.url) {
                self.frontier.record(&child.url, code, Some(error.clone()));
            }
            self.attribute(&child, code, Some(&error));
            return;
        }

        if self.frontier.try_claim(&child.url) {
            if child.external && !self.ctx.scope.forces_external() {
                if let Some(hit) = self.cached(&child.url) {
                    tracing::trace!("Cache hit for {}: {}", child.url, hit.response_code);
                    self.stats.cache_hits += 1;
                    self.resolve(child, hit.response_code, None);
                    return;
                }
            }
            self.dispatch(child);
            return;
        }

        match self.frontier.peek(&child.url) {
            Some(LinkState::Resolved { code, error }) => {
                self.attribute(&child, code, error.as_deref());
            }
            Some(LinkState::InFlight) => {
                tracing::trace!("Waiting on {} for {:?}", child.url, child.parent);
                self.waiting.entry(child.url.clone()).or_default().push(child);
            }
            None => tracing::warn!("{} vanished from the frontier", child.url),
        }
    }

    /// Returns a healthy cache entry for the URL
    fn cached(&self, url: &str) -> Option<ScannedLink> {
        self.cache
            .as_ref()?
            .get(url)
            .filter(|entry| !is_error_code(entry.response_code))
    }

    /// Adds a broken entry under the task's parent page, if the status calls for one
    fn attribute(&mut self, task: &LinkTask, code: u16, error: Option<&str>) {
        let Some(parent) = &task.parent else {
            return;
        };
        if !is_error_code(code) {
            return;
        }
        if self.ctx.is_ignored(code) {
            tracing::trace!("Ignoring {} ({}) on {}", task.url, code, parent);
            return;
        }

        if self.ctx.verbose {
            tracing::info!("Broken link on {}: {} ({})", parent, task.url, code);
        }

        self.report.add(
            parent,
            Broken {
                link: task.url.clone(),
                error: error.map(str::to_string),
                code,
            },
        );
    }
}

/// Turns a scanner task that panicked or was cancelled into a bad link
fn panicked_batch(task: LinkTask, err: &JoinError) -> ScanBatch {
    tracing::warn!("Scanner for {} failed: {}", task.url, err);
    ScanBatch::finalized(task, STATUS_BAD_LINK, Some(err.to_string()))
}
