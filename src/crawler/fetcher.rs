//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client from crawler configuration
//! - Issuing one GET per page, with no retries
//! - Classifying non-2xx responses and transport failures

use crate::config::CrawlerConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Reason a fetch did not produce a page body
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status_code} {reason}")]
    Status { status_code: u16, reason: String },

    #[error("{0}")]
    Network(String),
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// 2xx response with a readable body
    Success {
        /// The requested URL
        url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        reason: String,
    },

    /// Request never produced a usable response (DNS, refused, TLS, timeout)
    NetworkError {
        /// The requested URL
        url: String,
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// The URL that was requested
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::HttpError { url, .. } | Self::NetworkError { url, .. } => {
                url
            }
        }
    }

    /// HTTP status code, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } | Self::HttpError { status_code, .. } => {
                Some(*status_code)
            }
            Self::NetworkError { .. } => None,
        }
    }

    /// Page body for successful fetches
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Failure reason for unsuccessful fetches
    pub fn error(&self) -> Option<FetchError> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError {
                status_code,
                reason,
                ..
            } => Some(FetchError::Status {
                status_code: *status_code,
                reason: reason.clone(),
            }),
            Self::NetworkError { error, .. } => Some(FetchError::Network(error.clone())),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// The transport's default redirect policy is kept. A request timeout is
/// only set when the configuration asks for one.
///
/// # Example
///
/// ```no_run
/// use sumi_reach::config::CrawlerConfig;
/// use sumi_reach::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Fetches a URL with a single GET request
///
/// Never panics and never retries: every outcome, including transport
/// failures, comes back as a [`FetchResult`].
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx, body readable | `Success` |
/// | HTTP 2xx, body unreadable | `NetworkError` |
/// | Any other status | `HttpError` |
/// | Timeout / refused / DNS / TLS | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                url: url.to_string(),
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            url: url.to_string(),
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            url: url.to_string(),
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            url: url.to_string(),
            error: format!("Failed to read body: {}", describe_error(&e)),
        },
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
