//! Deadlink-Scout main entry point
//!
//! This is the command-line interface for the Deadlink-Scout link checker.

use anyhow::Context;
use clap::Parser;
use deadlink_scout::config::{load_options, ScanOptions};
use deadlink_scout::scan;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Deadlink-Scout: a concurrent broken-link scanner
///
/// Deadlink-Scout crawls every page below the given URL, checks each anchor
/// and image it references, and prints the broken ones as JSON, grouped by
/// the page that referenced them.
#[derive(Parser, Debug)]
#[command(name = "deadlink-scout")]
#[command(version)]
#[command(about = "A concurrent broken-link scanner", long_about = None)]
struct Cli {
    /// The URL to scan
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to a TOML options file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Comma separated HTTP status codes to treat as healthy
    #[arg(long, value_name = "CODES")]
    ignore_status: Option<String>,

    /// Do not validate TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Only recheck the pages reported in an earlier JSON result
    #[arg(long, value_name = "FILE")]
    past_result: Option<PathBuf>,

    /// Location of the response cache file
    #[arg(long, value_name = "FILE", conflicts_with = "no_cache")]
    cache_file: Option<PathBuf>,

    /// Disable the response cache
    #[arg(long)]
    no_cache: bool,

    /// Upper bound on simultaneous network requests
    #[arg(long, value_name = "N")]
    max_concurrent_requests: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> ScanOptions {
        ScanOptions {
            url: self.url.clone(),
            past_result_file: self.past_result.clone(),
            ignore_status: self.ignore_status.clone(),
            insecure: self.insecure,
            verbose: self.verbose > 0,
            max_concurrent_requests: self.max_concurrent_requests,
            cache_file: self.cache_file.clone(),
            no_cache: self.no_cache,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let options = match &cli.config {
        Some(path) => {
            tracing::info!("Loading options from: {}", path.display());
            let from_file = load_options(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            from_file.merge(cli.options())
        }
        None => cli.options(),
    };

    let seed = options.seed_url()?.to_string();
    let policy = options.into_policy()?;

    if policy.is_recheck() {
        tracing::info!("Rechecking pages from a past result");
    }

    let report = match scan(&seed, policy).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", report.to_json_pretty()?);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that stdout only carries the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("deadlink_scout=warn,warn"),
            1 => EnvFilter::new("deadlink_scout=info,warn"),
            2 => EnvFilter::new("deadlink_scout=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
