//! Worker pool executing dispatched crawl tasks
//!
//! The pool bounds how many tasks run at once with a semaphore. The drain loop
//! reserves a slot before it polls the frontier, so a task is only taken off the
//! queue when a worker is free to run it and priority order is kept end to end.
//!
//! Each task runs on its own tokio task. A failure or panic in one task stays
//! inside that task: the join set reports it and the crawl carries on.

use crate::classify::UrlClassifier;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::rate_limiter::RateLimiter;
use crate::storage::SharedStore;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Everything a worker touches while processing a task
pub struct WorkerContext {
    pub frontier: Arc<Frontier>,
    pub fetcher: Arc<dyn Fetcher>,
    pub store: SharedStore,
    pub classifier: Arc<UrlClassifier>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Fixed-size pool of concurrent fetch workers
pub struct WorkerPool {
    context: Arc<WorkerContext>,
    slots: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl WorkerPool {
    /// Creates a pool running at most `size` tasks at a time
    pub fn new(context: WorkerContext, size: usize) -> Self {
        Self {
            context: Arc::new(context),
            slots: Arc::new(Semaphore::new(size.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Waits for a free worker slot
    ///
    /// Returns `None` only if the pool has been closed.
    pub async fn reserve(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).acquire_owned().await.ok()
    }

    /// Runs `task` on the slot reserved by `permit`
    ///
    /// The task counts as in flight from this call until every child link has
    /// been offered back to the frontier and the page has been persisted.
    pub fn dispatch(&mut self, task: CrawlTask, permit: OwnedSemaphorePermit) {
        let in_flight = self.context.frontier.begin_task();
        let context = Arc::clone(&self.context);

        self.tasks.spawn(async move {
            let _permit = permit;
            let _in_flight = in_flight;
            process_task(&context, &task).await;
        });
    }

    /// Collects finished tasks without waiting, logging any that panicked
    pub fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_join_result(result);
        }
    }

    /// Number of spawned tasks not yet collected
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every dispatched task to finish
    pub async fn shutdown(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            log_join_result(result);
        }
        self.slots.close();
    }
}

fn log_join_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!("Worker task panicked: {}", e);
        } else {
            tracing::warn!("Worker task cancelled: {}", e);
        }
    }
}

/// Fetches one page, enqueues its children and records it in the graph store
pub async fn process_task(context: &WorkerContext, task: &CrawlTask) {
    context.rate_limiter.acquire().await;

    let links = match context.fetcher.fetch(&task.url).await {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Dropping {} (depth {}): {}", task.url, task.depth, e);
            return;
        }
    };

    let child_depth = task.depth + 1;
    let mut enqueued = 0;
    for link in &links {
        let priority = context.classifier.classify(link);
        if context
            .frontier
            .offer(CrawlTask::new(link.clone(), child_depth, priority))
        {
            enqueued += 1;
        }
    }

    persist_page(&context.store, &task.url, &links);

    tracing::debug!(
        "Processed {} (depth {}): {} links, {} newly queued",
        task.url,
        task.depth,
        links.len(),
        enqueued
    );
}

/// Writes the page as a node and every outbound link as an edge
///
/// Each store call stands alone: a failed write is logged and the rest still
/// go through.
fn persist_page(store: &SharedStore, url: &str, links: &HashSet<String>) {
    let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);

    if let Err(e) = store.upsert_node(url) {
        tracing::warn!("Failed to record node {}: {}", url, e);
    }

    for link in links {
        if let Err(e) = store.upsert_edge(url, link) {
            tracing::warn!("Failed to record edge {} -> {}: {}", url, link, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchError;
    use crate::storage::{GraphStore, SqliteGraphStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MapFetcher {
        pages: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<HashSet<String>, FetchError> {
            match self.pages.get(url) {
                Some(links) => Ok(links.iter().cloned().collect()),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, _url: &str) -> Result<HashSet<String>, FetchError> {
            panic!("parser blew up");
        }
    }

    fn create_test_context(fetcher: Arc<dyn Fetcher>) -> (WorkerContext, Arc<Mutex<SqliteGraphStore>>) {
        let store = Arc::new(Mutex::new(SqliteGraphStore::new_in_memory().unwrap()));
        let context = WorkerContext {
            frontier: Arc::new(Frontier::new()),
            fetcher,
            store: store.clone(),
            classifier: Arc::new(UrlClassifier::new()),
            rate_limiter: Arc::new(RateLimiter::new(1000.0).unwrap()),
        };
        (context, store)
    }

    fn map_fetcher(pages: &[(&str, &[&str])]) -> Arc<dyn Fetcher> {
        Arc::new(MapFetcher {
            pages: pages
                .iter()
                .map(|(url, links)| {
                    (
                        url.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_process_task_offers_children_and_persists() {
        let fetcher = map_fetcher(&[(
            "https://a.example/",
            &["https://b.example/", "https://research.example/"],
        )]);
        let (context, store) = create_test_context(fetcher);

        process_task(&context, &CrawlTask::new("https://a.example/", 0, 10)).await;

        let first = context.frontier.poll(Duration::from_millis(10)).await.unwrap();
        assert_eq!(first.url, "https://research.example/");
        assert_eq!(first.depth, 1);
        assert_eq!(first.priority, 5);

        let store = store.lock().unwrap();
        assert_eq!(store.list_nodes().unwrap(), vec!["https://a.example/"]);
        assert_eq!(store.count_edges().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_already_claimed_link_still_produces_edge() {
        let fetcher = map_fetcher(&[("https://a.example/", &["https://a.example/"])]);
        let (context, store) = create_test_context(fetcher);
        context
            .frontier
            .seed(CrawlTask::new("https://a.example/", 0, 10))
            .unwrap();
        context.frontier.poll(Duration::from_millis(10)).await.unwrap();

        process_task(&context, &CrawlTask::new("https://a.example/", 0, 10)).await;

        assert!(context.frontier.is_empty());
        assert_eq!(store.lock().unwrap().count_edges().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_records_nothing() {
        let (context, store) = create_test_context(map_fetcher(&[]));

        process_task(&context, &CrawlTask::new("https://gone.example/", 0, 10)).await;

        assert_eq!(store.lock().unwrap().count_nodes().unwrap(), 0);
        assert!(context.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_pool_dispatch_and_shutdown() {
        let fetcher = map_fetcher(&[
            ("https://a.example/", &["https://c.example/"]),
            ("https://b.example/", &[]),
        ]);
        let (context, store) = create_test_context(fetcher);
        let frontier = Arc::clone(&context.frontier);
        let mut pool = WorkerPool::new(context, 2);

        for url in ["https://a.example/", "https://b.example/"] {
            let permit = pool.reserve().await.unwrap();
            pool.dispatch(CrawlTask::new(url, 0, 10), permit);
        }
        pool.shutdown().await;

        assert_eq!(frontier.in_flight(), 0);
        assert_eq!(frontier.len(), 1);
        assert_eq!(store.lock().unwrap().count_nodes().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let (context, _store) = create_test_context(Arc::new(PanickingFetcher));
        let frontier = Arc::clone(&context.frontier);
        let mut pool = WorkerPool::new(context, 1);

        let permit = pool.reserve().await.unwrap();
        pool.dispatch(CrawlTask::new("https://a.example/", 0, 10), permit);
        pool.shutdown().await;

        assert_eq!(frontier.in_flight(), 0);
        assert!(frontier.is_quiescent());
    }

    #[tokio::test]
    async fn test_reserve_bounds_concurrency() {
        let (context, _store) = create_test_context(map_fetcher(&[]));
        let pool = WorkerPool::new(context, 1);

        let held = pool.reserve().await.unwrap();
        let second = tokio::time::timeout(Duration::from_millis(20), pool.reserve()).await;
        assert!(second.is_err());

        drop(held);
        assert!(pool.reserve().await.is_some());
    }
}
