//! Crawler module for fetching pages and scheduling the crawl
//!
//! This module contains the core crawling logic, including:
//! - The priority frontier with URL deduplication and in-flight accounting
//! - Global fetch rate limiting
//! - The worker pool that fetches pages and feeds links back
//! - The scheduler state machine that runs one crawl to completion
//! - HTTP fetching and HTML link extraction

mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;
mod scheduler;
mod worker;

pub use fetcher::{build_http_client, canonicalize, FetchError, Fetcher, HttpFetcher};
pub use frontier::{CrawlTask, Frontier, InFlightGuard};
pub use parser::extract_links;
pub use rate_limiter::{permit_period, RateLimiter};
pub use scheduler::{CrawlPhase, CrawlScheduler};
pub use worker::{process_task, WorkerContext, WorkerPool};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::storage::open_store;
use crate::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Runs a complete crawl against the configured SQLite store over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the graph store at `output.database-path`
/// 2. Build the HTTP client from the `user-agent` section
/// 3. Crawl outward from `seed_url`
/// 4. Rank the discovered graph and return the report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed_url` - Absolute HTTP(S) URL to start from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(RippleError)` - Crawl could not start or its graph could not be read back
pub async fn run_crawl(config: &Config, seed_url: &str) -> Result<CrawlReport> {
    let store = open_store(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.user_agent)?;

    let scheduler = CrawlScheduler::new(config, Arc::new(Mutex::new(store)), Arc::new(fetcher))?;
    scheduler.start_crawl(seed_url).await
}
