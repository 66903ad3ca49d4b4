//! Crawl statistics
//!
//! Workers bump lock-free counters while they run; once the pool has been
//! joined the counters and the frontier sizes are frozen into a
//! [`CrawlReport`] for display.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Live counters shared by all workers of one crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicUsize,
    pages_failed: AtomicUsize,
    links_discovered: AtomicUsize,
    links_rejected: AtomicUsize,
    invalid_links: AtomicUsize,
    sink_failures: AtomicUsize,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch and returns the running total
    pub fn record_fetched(&self) -> usize {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A link that became a new frontier task
    pub fn record_discovered(&self) {
        self.links_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// A valid link that was already seen or too deep
    pub fn record_rejected(&self) {
        self.links_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn pages_failed(&self) -> usize {
        self.pages_failed.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a report
    pub fn report(
        &self,
        urls_seen: usize,
        pending_remaining: usize,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        stopped: bool,
    ) -> CrawlReport {
        CrawlReport {
            pages_fetched: self.pages_fetched(),
            pages_failed: self.pages_failed(),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_rejected: self.links_rejected.load(Ordering::Relaxed),
            invalid_links: self.invalid_links.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            urls_seen,
            pending_remaining,
            started_at,
            finished_at: Utc::now(),
            elapsed,
            stopped,
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages fetched with a 2xx status
    pub pages_fetched: usize,

    /// Pages that failed with a non-2xx status or transport error
    pub pages_failed: usize,

    /// Links that were queued as new tasks
    pub links_discovered: usize,

    /// Valid links dropped as duplicates or beyond the depth limit
    pub links_rejected: usize,

    /// Links that could not be resolved to a crawlable URL
    pub invalid_links: usize,

    /// Pages the sink failed to persist
    pub sink_failures: usize,

    /// Distinct URLs ever accepted into the frontier
    pub urls_seen: usize,

    /// Tasks never claimed (non-zero only after a stop)
    pub pending_remaining: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Whether the crawl was stopped before the frontier ran dry
    pub stopped: bool,
}

impl CrawlReport {
    /// Pages that were fetched or attempted
    pub fn pages_attempted(&self) -> usize {
        self.pages_fetched + self.pages_failed
    }

    /// Share of attempted pages that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }

    /// Average throughput over the whole run
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= f64::EPSILON {
            return 0.0;
        }
        self.pages_attempted() as f64 / secs
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", report.elapsed.as_secs_f64());
    if report.stopped {
        println!(
            "  Stopped early ({} tasks left unclaimed)",
            report.pending_remaining
        );
    }
    println!();

    println!("Pages:");
    println!("  Fetched: {}", report.pages_fetched);
    println!("  Failed: {}", report.pages_failed);
    println!("  Distinct URLs seen: {}", report.urls_seen);
    if report.sink_failures > 0 {
        println!("  Not saved: {}", report.sink_failures);
    }
    println!();

    println!("Links:");
    println!("  Queued: {}", report.links_discovered);
    println!("  Already seen or too deep: {}", report.links_rejected);
    println!("  Invalid: {}", report.invalid_links);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages, {:.2} pages/sec)",
        report.success_rate(),
        report.pages_fetched,
        report.pages_attempted(),
        report.pages_per_second()
    );
}
