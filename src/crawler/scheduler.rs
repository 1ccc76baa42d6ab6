//! Crawl scheduler driving one crawl from seed to ranked report
//!
//! A crawl moves through a fixed sequence of phases:
//!
//! ```text
//! Idle -> Seeding -> Draining -> AwaitingCompletion -> Terminated
//! ```
//!
//! - **Seeding**: the graph store is cleared, a fresh frontier and classifier
//!   are created and the seed is queued at depth 0.
//! - **Draining**: the control loop polls the frontier and dispatches tasks to
//!   the worker pool until nothing is queued and nothing is in flight.
//! - **AwaitingCompletion**: dispatching stops and the loop waits for every
//!   worker task to finish.
//! - **Terminated**: the graph is read back, ranked, and reported.
//!
//! Every crawl owns its own frontier and side-lists, so nothing leaks from one
//! crawl into the next. A scheduler runs one crawl at a time.

use crate::classify::UrlClassifier;
use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{canonicalize, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::worker::{WorkerContext, WorkerPool};
use crate::output::{CrawlReport, CrawlStatus};
use crate::rank::RankEngine;
use crate::storage::{GraphStore, SharedStore};
use crate::{Result, RippleError};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// State of the scheduler's crawl state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Seeding,
    Draining,
    AwaitingCompletion,
    Terminated,
}

impl CrawlPhase {
    /// True while a crawl is running
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Seeding | Self::Draining | Self::AwaitingCompletion
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Draining => "draining",
            Self::AwaitingCompletion => "awaiting-completion",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Outcome of the drain loop
struct DrainOutcome {
    visited: usize,
    capped: bool,
}

/// Puts the scheduler back to `Idle` when dropped while still armed
struct PhaseReset<'a> {
    phase: &'a Mutex<CrawlPhase>,
    armed: bool,
}

impl<'a> PhaseReset<'a> {
    fn new(phase: &'a Mutex<CrawlPhase>) -> Self {
        Self { phase, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("Crawl abandoned in phase {}, resetting to idle", *phase);
        *phase = CrawlPhase::Idle;
    }
}

/// Crawl scheduler owning the rate limiter, graph store and fetcher
pub struct CrawlScheduler {
    config: CrawlerConfig,
    engine: RankEngine,
    store: SharedStore,
    fetcher: Arc<dyn Fetcher>,
    rate_limiter: Arc<RateLimiter>,
    phase: Mutex<CrawlPhase>,
}

impl CrawlScheduler {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - Graph store the crawl is written to
    /// * `fetcher` - Fetch+parse collaborator
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlScheduler)` - Ready to crawl
    /// * `Err(RippleError)` - The rate limit could not be scheduled
    pub fn new(config: &Config, store: SharedStore, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let rate_limiter = RateLimiter::new(config.crawler.rate_limit)?;

        Ok(Self {
            config: config.crawler.clone(),
            engine: RankEngine::from(&config.rank),
            store,
            fetcher,
            rate_limiter: Arc::new(rate_limiter),
            phase: Mutex::new(CrawlPhase::Idle),
        })
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> CrawlPhase {
        *self.lock_phase()
    }

    fn lock_phase(&self) -> MutexGuard<'_, CrawlPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: CrawlPhase) {
        let mut current = self.lock_phase();
        tracing::debug!("Crawl phase {} -> {}", *current, phase);
        *current = phase;
    }

    /// Crawls outward from `seed_url` and ranks the resulting graph
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute HTTP(S) URL to start from
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Ranked pages, sorted by rank descending
    /// * `Err(RippleError::InvalidSeed)` - The seed is not an absolute HTTP(S) URL
    /// * `Err(RippleError::SchedulerMisuse)` - A crawl is already running
    /// * `Err(RippleError::Store)` - The finished graph could not be read back
    pub async fn start_crawl(&self, seed_url: &str) -> Result<CrawlReport> {
        let seed = validate_seed(seed_url)?;

        {
            let mut phase = self.lock_phase();
            if phase.is_busy() {
                return Err(RippleError::SchedulerMisuse(format!(
                    "crawl already in progress (phase {}), refusing seed {}",
                    *phase, seed
                )));
            }
            *phase = CrawlPhase::Seeding;
        }

        // Returns the phase to Idle on error or if this future is dropped mid-crawl
        let reset = PhaseReset::new(&self.phase);
        let report = self.run(&seed).await?;
        reset.disarm();
        self.set_phase(CrawlPhase::Terminated);
        Ok(report)
    }

    async fn run(&self, seed: &str) -> Result<CrawlReport> {
        let started = Instant::now();
        tracing::info!(
            "Starting crawl from {} (max depth {}, pool size {}, {} fetches/sec)",
            seed,
            self.config.max_depth,
            self.config.pool_size,
            self.rate_limiter.rate()
        );

        // Seeding
        if let Err(e) = self.lock_store().clear() {
            tracing::warn!("Failed to clear graph store: {}", e);
        }

        let frontier = Arc::new(Frontier::new());
        let classifier = Arc::new(UrlClassifier::new());
        let priority = classifier.classify(seed);
        frontier.seed(CrawlTask::new(seed, 0, priority))?;

        let mut pool = WorkerPool::new(
            WorkerContext {
                frontier: Arc::clone(&frontier),
                fetcher: Arc::clone(&self.fetcher),
                store: Arc::clone(&self.store),
                classifier: Arc::clone(&classifier),
                rate_limiter: Arc::clone(&self.rate_limiter),
            },
            self.config.pool_size as usize,
        );

        // Draining
        self.set_phase(CrawlPhase::Draining);
        let outcome = self.drain(&frontier, &mut pool).await;

        // AwaitingCompletion
        self.set_phase(CrawlPhase::AwaitingCompletion);
        tracing::info!(
            "Frontier drained, waiting for {} worker tasks",
            pool.pending()
        );
        pool.shutdown().await;

        // Terminated: rank the finished graph
        let (nodes, graph) = {
            let store = self.lock_store();
            (store.list_nodes()?, store.list_graph()?)
        };

        let ranks = self.engine.compute(&nodes, &graph);
        {
            let mut store = self.lock_store();
            for (url, rank) in ranks.iter() {
                if let Err(e) = store.write_rank(url, rank) {
                    tracing::warn!("Failed to store rank for {}: {}", url, e);
                }
            }
        }

        let status = if outcome.capped {
            CrawlStatus::Capped
        } else {
            CrawlStatus::Success
        };
        let elapsed = started.elapsed();
        let report = CrawlReport::build(status, &nodes, &graph, &ranks)
            .with_side_lists(
                classifier.blacklisted().snapshot(),
                classifier.low_priority().snapshot(),
            )
            .with_duration(elapsed);

        self.log_performance(elapsed, outcome.visited, report.total_urls_crawled);

        Ok(report)
    }

    /// Polls the frontier and dispatches tasks until the crawl is quiescent
    /// or the visited cap is reached
    async fn drain(&self, frontier: &Arc<Frontier>, pool: &mut WorkerPool) -> DrainOutcome {
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let max_depth = self.config.max_depth;
        let mut visited: HashSet<String> = HashSet::new();
        let mut capped = false;

        loop {
            pool.reap();

            if let Some(cap) = self.config.max_visited_urls {
                if visited.len() >= cap {
                    tracing::warn!(
                        "Visited cap of {} URLs reached, {} tasks left in frontier",
                        cap,
                        frontier.len()
                    );
                    capped = true;
                    break;
                }
            }

            let Some(slot) = pool.reserve().await else {
                tracing::error!("Worker pool closed during drain");
                break;
            };

            match frontier.poll(poll_interval).await {
                Some(task) => {
                    if task.depth >= max_depth {
                        tracing::debug!("Skipping {} at depth {}", task.url, task.depth);
                        continue;
                    }
                    if !visited.insert(task.url.clone()) {
                        tracing::debug!("Skipping already visited {}", task.url);
                        continue;
                    }

                    tracing::debug!(
                        "Dispatching {} (depth {}, priority {})",
                        task.url,
                        task.depth,
                        task.priority
                    );
                    pool.dispatch(task, slot);

                    if visited.len() % 10 == 0 {
                        tracing::info!(
                            "Progress: {} URLs dispatched, {} queued, {} in flight",
                            visited.len(),
                            frontier.len(),
                            frontier.in_flight()
                        );
                    }
                }
                None => {
                    drop(slot);
                    if frontier.is_quiescent() {
                        break;
                    }
                    tracing::debug!(
                        "Frontier idle, {} tasks still in flight",
                        frontier.in_flight()
                    );
                }
            }
        }

        DrainOutcome {
            visited: visited.len(),
            capped,
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, dyn GraphStore + 'static> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log_performance(&self, elapsed: Duration, visited: usize, recorded: usize) {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { visited as f64 / secs } else { 0.0 };
        tracing::info!(
            "Crawl finished in {:.2}s: {} URLs visited, {} recorded ({:.2} URLs/sec, pool size {}, max depth {})",
            secs,
            visited,
            recorded,
            rate,
            self.config.pool_size,
            self.config.max_depth
        );
    }
}

/// Checks that the seed is an absolute HTTP(S) URL and returns its canonical form
fn validate_seed(seed_url: &str) -> Result<String> {
    let seed = canonicalize(seed_url).map_err(|e| RippleError::InvalidSeed {
        url: seed_url.to_string(),
        reason: e.to_string(),
    })?;

    if !(seed.starts_with("http://") || seed.starts_with("https://")) {
        return Err(RippleError::InvalidSeed {
            url: seed_url.to_string(),
            reason: "only http and https URLs can be crawled".to_string(),
        });
    }

    Ok(seed)
}
