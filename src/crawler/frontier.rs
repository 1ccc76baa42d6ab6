//! Priority frontier shared between the drain loop and the workers
//!
//! The frontier holds pending crawl tasks ordered by priority, the set of URLs
//! already claimed for this crawl, and the number of dispatched tasks that have
//! not finished yet. All three live behind one lock so that "nothing queued and
//! nothing running" is observed atomically.

use crate::classify::Priority;
use crate::RippleError;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to fetch
    pub url: String,

    /// Distance from the seed
    pub depth: u32,

    /// Classifier output (lower is fetched first)
    pub priority: Priority,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32, priority: Priority) -> Self {
        Self {
            url: url.into(),
            depth,
            priority,
        }
    }
}

/// Heap entry: equal priorities are served in insertion order
#[derive(Debug)]
struct QueuedTask {
    task: CrawlTask,
    sequence: u64,
}

// BinaryHeap is a max-heap, so compare in reverse to pop the lowest priority first
impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .task
            .priority
            .cmp(&self.task.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for QueuedTask {}

#[derive(Debug, Default)]
struct FrontierState {
    queue: BinaryHeap<QueuedTask>,
    claimed: HashSet<String>,
    next_sequence: u64,
    in_flight: usize,
    seeded: bool,
}

impl FrontierState {
    fn push(&mut self, task: CrawlTask) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(QueuedTask { task, sequence });
    }

    fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

/// Concurrency-safe priority queue with URL deduplication
///
/// One frontier serves exactly one crawl.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts the initial task of the crawl
    ///
    /// Fails if the frontier has already been seeded.
    pub fn seed(&self, task: CrawlTask) -> Result<(), RippleError> {
        {
            let mut state = self.lock();
            if state.seeded {
                return Err(RippleError::SchedulerMisuse(format!(
                    "frontier already seeded, refusing {}",
                    task.url
                )));
            }
            state.seeded = true;
            state.claimed.insert(task.url.clone());
            state.push(task);
        }
        self.changed.notify_one();
        Ok(())
    }

    /// Claims the task's URL and queues the task
    ///
    /// Returns false without queueing if the URL was already claimed. Exactly
    /// one of several concurrent offers for the same URL succeeds.
    pub fn offer(&self, task: CrawlTask) -> bool {
        {
            let mut state = self.lock();
            if !state.claimed.insert(task.url.clone()) {
                return false;
            }
            state.push(task);
        }
        self.changed.notify_one();
        true
    }

    /// Removes the lowest-priority task, waiting up to `timeout` for one
    ///
    /// Returns `None` on timeout, or immediately once the frontier is empty
    /// with no task in flight, since nothing can arrive after that.
    pub async fn poll(&self, timeout: Duration) -> Option<CrawlTask> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(queued) = state.queue.pop() {
                    return Some(queued.task);
                }
                if state.is_quiescent() {
                    return None;
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.lock().queue.pop().map(|queued| queued.task);
            }
        }
    }

    /// Marks a task as dispatched; the returned guard marks it finished on drop
    pub fn begin_task(self: &Arc<Self>) -> InFlightGuard {
        self.lock().in_flight += 1;
        InFlightGuard {
            frontier: Arc::clone(self),
        }
    }

    fn finish_task(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_one();
    }

    /// True when nothing is queued and no dispatched task is still running
    pub fn is_quiescent(&self) -> bool {
        self.lock().is_quiescent()
    }

    pub fn is_claimed(&self, url: &str) -> bool {
        self.lock().claimed.contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}

/// Keeps a task counted as in flight until dropped
///
/// Dropping happens after the worker has offered every child link, so the
/// frontier never looks idle while children are still on their way in.
#[derive(Debug)]
pub struct InFlightGuard {
    frontier: Arc<Frontier>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.frontier.finish_task();
    }
}
