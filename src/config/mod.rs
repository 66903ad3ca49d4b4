//! Configuration module for Sumi-Reach
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The CLI can also build a [`Config`] directly and override individual fields.
//!
//! # Example
//!
//! ```no_run
//! use sumi_reach::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DepthBoundary, OutputConfig, DEFAULT_MAX_DEPTH, DEFAULT_WORKER_COUNT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config_with_hash};
pub use validation::validate;
