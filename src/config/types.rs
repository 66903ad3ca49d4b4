use serde::Deserialize;

/// Default number of concurrent workers
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Main configuration structure for Sumi-Reach
///
/// Every section is optional in the TOML file; missing values fall back to
/// [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URLs the crawl starts from (depth 0)
    pub seeds: Vec<String>,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Maximum number of link hops from a seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Whether pages at exactly `max_depth` are fetched
    #[serde(rename = "depth-boundary")]
    pub depth_boundary: DepthBoundary,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Overall request timeout in seconds. `None` keeps the transport default.
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_depth: DEFAULT_MAX_DEPTH,
            depth_boundary: DepthBoundary::default(),
            user_agent: format!("sumi-reach/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: None,
        }
    }
}

/// How the depth limit treats a task sitting exactly on `max_depth`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthBoundary {
    /// `depth <= max_depth` is crawled
    #[default]
    Inclusive,
    /// `depth < max_depth` is crawled
    Exclusive,
}

impl DepthBoundary {
    /// Returns true if a task at `depth` may enter the frontier
    pub fn admits(self, depth: u32, max_depth: u32) -> bool {
        match self {
            Self::Inclusive => depth <= max_depth,
            Self::Exclusive => depth < max_depth,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory fetched pages are written to
    pub directory: String,

    /// Whether fetched pages are written at all
    #[serde(rename = "save-pages")]
    pub save_pages: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            save_pages: true,
        }
    }
}
