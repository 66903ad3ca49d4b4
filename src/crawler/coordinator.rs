//! Crawler coordinator - worker pool and crawl orchestration
//!
//! This module contains the worker loop that drives a crawl:
//! - Seeding the frontier from the configuration
//! - Running a fixed pool of workers that claim tasks from the frontier
//! - Fetching pages, handing bodies to the sink, and queueing new links
//! - Detecting the end of the crawl and producing a report

use crate::config::{validate, Config};
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::{Claim, CrawlTask, DepthLimit, Frontier};
use crate::output::{sink_for, CrawlReport, CrawlStats, Sink};
use crate::url::{normalize_seed, resolve};
use crate::CrawlError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Log a progress line every this many fetched pages
const PROGRESS_INTERVAL: usize = 10;

/// Main crawler coordinator structure
///
/// One coordinator owns one crawl session: its frontier, client, sink and
/// counters are created in [`Coordinator::new`] and dropped when
/// [`Coordinator::run`] returns.
pub struct Coordinator {
    config: Arc<Config>,
    frontier: Arc<Frontier>,
    client: Client,
    sink: Arc<dyn Sink>,
    stats: Arc<CrawlStats>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration, builds the HTTP client and seeds the
    /// frontier. This is the only place a crawl can fail: once `run` starts,
    /// per-page errors are logged and skipped.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Receives the body of every successfully fetched page
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or client setup failure
    pub fn new(config: Config, sink: Arc<dyn Sink>) -> Result<Self, CrawlError> {
        validate(&config)?;

        let seeds = config
            .seeds
            .iter()
            .map(|seed| normalize_seed(seed))
            .collect::<Result<Vec<_>, _>>()?;

        let client = build_http_client(&config.crawler)?;

        let frontier = Frontier::new(DepthLimit::from(&config.crawler));
        let seeded = frontier.seed(seeds);
        tracing::info!("Seeded frontier with {} URLs", seeded);

        Ok(Self {
            config: Arc::new(config),
            frontier: Arc::new(frontier),
            client,
            sink,
            stats: Arc::new(CrawlStats::new()),
        })
    }

    /// Returns the frontier shared by this crawl's workers
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Returns a handle that can stop the crawl from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            frontier: Arc::clone(&self.frontier),
        }
    }

    /// Runs the crawl to completion
    ///
    /// Spawns `worker_count` workers and waits for all of them. Workers exit
    /// once the frontier is empty and no task is in flight, or after a stop
    /// request once their current page is done.
    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let worker_count = self.config.crawler.worker_count;

        tracing::info!(
            "Starting crawl with {} workers (max depth {}, {:?} boundary)",
            worker_count,
            self.config.crawler.max_depth,
            self.config.crawler.depth_boundary
        );

        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let worker = Worker {
                    id,
                    frontier: Arc::clone(&self.frontier),
                    client: self.client.clone(),
                    sink: Arc::clone(&self.sink),
                    stats: Arc::clone(&self.stats),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let mut failure = None;
        for (id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
                if failure.is_none() {
                    failure = Some(CrawlError::Worker {
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let stopped = self.frontier.is_closed();
        let report = self.stats.report(
            self.frontier.seen_len(),
            self.frontier.pending_len(),
            started_at,
            start_time.elapsed(),
            stopped,
        );

        tracing::info!(
            "Crawl {}: {} pages fetched, {} failed, {} URLs seen in {:?}",
            if stopped { "stopped" } else { "completed" },
            report.pages_fetched,
            report.pages_failed,
            report.urls_seen,
            report.elapsed
        );

        Ok(report)
    }
}

/// Cooperative stop signal for a running crawl
///
/// Stopping never interrupts a fetch in progress: workers finish their
/// current page and then find no more work.
#[derive(Debug, Clone)]
pub struct StopHandle {
    frontier: Arc<Frontier>,
}

impl StopHandle {
    pub fn stop(&self) {
        tracing::info!("Stop requested, finishing in-flight pages");
        self.frontier.close();
    }

    pub fn is_stopped(&self) -> bool {
        self.frontier.is_closed()
    }
}

/// Releases a claimed in-flight slot when dropped, including on panic
struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

struct Worker {
    id: usize,
    frontier: Arc<Frontier>,
    client: Client,
    sink: Arc<dyn Sink>,
    stats: Arc<CrawlStats>,
}

impl Worker {
    async fn run(self) {
        tracing::trace!("Worker {} started", self.id);

        loop {
            let changed = self.frontier.changed();

            match self.frontier.claim() {
                Claim::Task(task) => {
                    drop(changed);
                    let _slot = InFlight(&self.frontier);
                    self.process(&task).await;
                }
                Claim::Idle => changed.await,
                Claim::Exhausted => break,
            }
        }

        tracing::trace!("Worker {} finished", self.id);
    }

    /// Fetches one page and queues the links it contains
    async fn process(&self, task: &CrawlTask) {
        tracing::debug!("Fetching URL: {} (depth {})", task.url, task.depth);

        match fetch_url(&self.client, &task.url).await {
            FetchResult::Success {
                status_code, body, ..
            } => {
                let fetched = self.stats.record_fetched();
                tracing::debug!("Successfully fetched: {} (status {})", task.url, status_code);

                // Skip extraction when no child could be admitted anyway
                if self.frontier.limit().admits(task.depth.saturating_add(1)) {
                    self.discover(task, &body);
                }

                self.persist(task.url.clone(), body).await;

                if fetched % PROGRESS_INTERVAL == 0 {
                    tracing::info!(
                        "Progress: {} pages fetched, {} pending, {} in flight, {} URLs seen",
                        fetched,
                        self.frontier.pending_len(),
                        self.frontier.in_flight(),
                        self.frontier.seen_len()
                    );
                }
            }
            failure => {
                self.stats.record_failed();
                if let Some(e) = failure.error() {
                    tracing::warn!("Failed to fetch {}: {}", task.url, e);
                }
            }
        }
    }

    fn discover(&self, task: &CrawlTask, body: &str) {
        let depth = task.depth.saturating_add(1);

        for link in extract_links(body) {
            let url = match resolve(&task.url, link) {
                Ok(url) => url,
                Err(e) => {
                    self.stats.record_invalid();
                    tracing::debug!("Skipping link {:?} on {}: {}", link, task.url, e);
                    continue;
                }
            };

            if self.frontier.try_discover(&url, depth) {
                self.stats.record_discovered();
                tracing::debug!("Discovered URL: {} (depth {})", url, depth);
            } else {
                self.stats.record_rejected();
                tracing::trace!("Already seen or too deep: {}", url);
            }
        }
    }

    async fn persist(&self, url: String, body: String) {
        let sink = Arc::clone(&self.sink);
        let outcome = tokio::task::spawn_blocking(move || {
            let result = sink.persist(&url, &body);
            (url, result)
        })
        .await;

        match outcome {
            Ok((_, Ok(()))) => {}
            Ok((url, Err(e))) => {
                self.stats.record_sink_failure();
                tracing::warn!("Failed to save content of {}: {}", url, e);
            }
            Err(e) => {
                self.stats.record_sink_failure();
                tracing::warn!("Sink task failed: {}", e);
            }
        }
    }
}

/// Runs a complete crawl with the sink described by the configuration
///
/// # Example
///
/// ```no_run
/// use sumi_reach::config::load_config;
/// use sumi_reach::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} pages fetched", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    validate(&config)?;
    let sink = sink_for(&config.output)?;
    Coordinator::new(config, sink)?.run().await
}
