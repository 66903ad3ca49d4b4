//! Sink trait and error types
//!
//! A sink receives every successfully fetched page. The crawl never depends
//! on what a sink does with it: failures are logged and the crawl moves on.

use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors that can occur while persisting a page
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for fetched page content
///
/// Implementations must be thread-safe; `persist` is called from a blocking
/// thread pool and may run concurrently for different pages.
pub trait Sink: Send + Sync {
    /// Stores the body fetched from `url`
    fn persist(&self, url: &str, body: &str) -> SinkResult<()>;
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn persist(&self, _url: &str, _body: &str) -> SinkResult<()> {
        Ok(())
    }
}

/// A page captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub url: String,
    pub body: String,
}

/// Sink that keeps every page in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    pages: Mutex<Vec<SavedPage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all pages received so far
    pub fn pages(&self) -> Vec<SavedPage> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs received so far, sorted
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.pages().into_iter().map(|page| page.url).collect();
        urls.sort();
        urls
    }

    pub fn len(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn persist(&self, url: &str, body: &str) -> SinkResult<()> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SavedPage {
                url: url.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
