//! Output module for fetched pages and crawl reports
//!
//! This module handles:
//! - The [`Sink`] collaborator that receives every fetched page
//! - Writing pages to uniquely named files
//! - Counting crawl events and printing the final report

mod file_sink;
pub mod stats;
mod traits;

pub use file_sink::{generate_filename, FileSink};
pub use stats::{print_report, CrawlReport, CrawlStats};
pub use traits::{MemorySink, NullSink, SavedPage, Sink, SinkError, SinkResult};

use crate::config::OutputConfig;
use std::sync::Arc;

/// Builds the sink described by the output configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Sink>)` - A [`FileSink`] when saving is enabled, otherwise a [`NullSink`]
/// * `Err(SinkError)` - The output directory could not be created
pub fn sink_for(config: &OutputConfig) -> SinkResult<Arc<dyn Sink>> {
    if config.save_pages {
        Ok(Arc::new(FileSink::new(&config.directory)?))
    } else {
        Ok(Arc::new(NullSink))
    }
}
