//! Crawl frontier: the shared work queue and dedup set
//!
//! This module handles:
//! - FIFO queueing of (URL, depth) tasks
//! - The all-time-seen URL set used for deduplication
//! - Depth limiting at the point of discovery
//! - In-flight bookkeeping used to detect the end of a crawl
//!
//! Everything lives behind a single mutex. A URL enters `seen` in the same
//! critical section that pushes it onto `pending`, so concurrent discoveries
//! of one URL produce exactly one task.

use crate::config::{CrawlerConfig, DepthBoundary};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Absolute, canonical URL to fetch
    pub url: String,

    /// Link hops from the seed this URL was first reached from
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Maximum depth plus the rule for the boundary itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimit {
    pub max_depth: u32,
    pub boundary: DepthBoundary,
}

impl DepthLimit {
    pub fn new(max_depth: u32, boundary: DepthBoundary) -> Self {
        Self {
            max_depth,
            boundary,
        }
    }

    /// Inclusive limit, the default boundary
    pub fn inclusive(max_depth: u32) -> Self {
        Self::new(max_depth, DepthBoundary::Inclusive)
    }

    /// Returns true if a task at `depth` may be queued
    pub fn admits(&self, depth: u32) -> bool {
        self.boundary.admits(depth, self.max_depth)
    }
}

impl From<&CrawlerConfig> for DepthLimit {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(config.max_depth, config.depth_boundary)
    }
}

/// Outcome of a worker asking for work
#[derive(Debug, PartialEq, Eq)]
pub enum Claim {
    /// A task to process; the caller now owns one in-flight slot
    Task(CrawlTask),

    /// Nothing pending, but in-flight tasks may still discover more
    Idle,

    /// Nothing pending and nothing in flight (or the crawl was stopped)
    Exhausted,
}

#[derive(Debug, Default)]
struct FrontierState {
    pending: VecDeque<CrawlTask>,
    seen: HashSet<String>,
    in_flight: usize,
    closed: bool,
}

/// Thread-safe frontier shared by all workers of one crawl
#[derive(Debug)]
pub struct Frontier {
    limit: DepthLimit,
    state: Mutex<FrontierState>,
    wakeup: Notify,
}

impl Frontier {
    /// Creates an empty frontier with the given depth limit
    pub fn new(limit: DepthLimit) -> Self {
        Self {
            limit,
            state: Mutex::new(FrontierState::default()),
            wakeup: Notify::new(),
        }
    }

    /// Returns the depth limit applied by [`Frontier::try_discover`]
    pub fn limit(&self) -> DepthLimit {
        self.limit
    }

    /// Queues seed URLs at depth 0
    ///
    /// Seeds bypass the depth limit; duplicates among them are dropped.
    ///
    /// # Returns
    ///
    /// The number of seeds actually queued
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = {
            let mut state = self.lock();
            let mut added = 0;
            for url in urls {
                let url = url.into();
                if state.seen.insert(url.clone()) {
                    state.pending.push_back(CrawlTask::new(url, 0));
                    added += 1;
                }
            }
            added
        };

        if added > 0 {
            self.wakeup.notify_waiters();
        }
        added
    }

    /// Queues `url` at `depth` if the depth is allowed and the URL is new
    ///
    /// The membership check and the insert happen under one lock, so among
    /// any number of concurrent calls for the same URL exactly one returns
    /// true.
    pub fn try_discover(&self, url: &str, depth: u32) -> bool {
        if !self.limit.admits(depth) {
            return false;
        }

        let inserted = {
            let mut state = self.lock();
            if state.seen.contains(url) {
                false
            } else {
                state.seen.insert(url.to_string());
                state.pending.push_back(CrawlTask::new(url, depth));
                true
            }
        };

        if inserted {
            self.wakeup.notify_waiters();
        }
        inserted
    }

    /// Removes and returns the oldest pending task
    ///
    /// This does not touch the in-flight count; workers use [`Frontier::claim`].
    pub fn pop(&self) -> Option<CrawlTask> {
        self.lock().pending.pop_front()
    }

    /// Pops a task and marks it in flight, or reports why none is available
    ///
    /// Pending length and in-flight count are read under the same lock that
    /// guards discovery, so `Exhausted` can never race with a page that is
    /// about to queue new links.
    pub fn claim(&self) -> Claim {
        let mut state = self.lock();

        if state.closed {
            return Claim::Exhausted;
        }

        match state.pending.pop_front() {
            Some(task) => {
                state.in_flight += 1;
                Claim::Task(task)
            }
            None if state.in_flight == 0 => Claim::Exhausted,
            None => Claim::Idle,
        }
    }

    /// Releases the in-flight slot taken by a successful [`Frontier::claim`]
    ///
    /// Must be called after all discoveries for the task have been made.
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.wakeup.notify_waiters();
    }

    /// Future that resolves the next time the frontier changes
    ///
    /// Obtain it *before* calling [`Frontier::claim`]; a change that happens
    /// between the claim and the await is then still observed.
    pub fn changed(&self) -> Notified<'_> {
        self.wakeup.notified()
    }

    /// Stops handing out tasks; in-flight tasks still finish
    pub fn close(&self) {
        self.lock().closed = true;
        self.wakeup.notify_waiters();
    }

    /// Returns true once [`Frontier::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns true if nothing is pending and nothing is in flight
    pub fn is_exhausted(&self) -> bool {
        let state = self.lock();
        state.pending.is_empty() && state.in_flight == 0
    }

    /// Returns true if `url` was ever queued
    pub fn contains(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Number of tasks waiting to be claimed
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of distinct URLs ever queued
    pub fn seen_len(&self) -> usize {
        self.lock().seen.len()
    }

    /// Number of tasks claimed but not yet completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    // A panicking worker must not wedge the others, so poisoning is ignored:
    // every critical section leaves the state consistent.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
