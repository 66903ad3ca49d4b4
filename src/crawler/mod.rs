//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier with dedup and depth limiting
//! - HTTP fetching
//! - Pattern-based link extraction
//! - The worker pool that ties them together

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, Coordinator, StopHandle};
pub use extractor::{extract_links, Links};
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchResult};
pub use frontier::{Claim, CrawlTask, DepthLimit, Frontier};
