use crate::output::traits::{Sink, SinkError, SinkResult};
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

/// Longest basename kept in a generated file name
const MAX_BASENAME_LEN: usize = 64;

/// Writes each fetched page to its own file
///
/// Files are named `fetched_content_<basename>_<uuid>.html`, where the
/// basename comes from the last path segment of the URL (or its host for
/// root pages). The random suffix keeps names unique even when many pages
/// share a basename.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    /// Creates a sink writing into `directory`, creating it if needed
    pub fn new(directory: impl AsRef<Path>) -> SinkResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Picks a fresh file path for `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.directory.join(generate_filename(url))
    }
}

impl Sink for FileSink {
    fn persist(&self, url: &str, body: &str) -> SinkResult<()> {
        let path = self.path_for(url);
        std::fs::write(&path, body).map_err(|source| SinkError::Write {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Content of {} saved to {}", url, path.display());
        Ok(())
    }
}

/// Generates a unique file name for a page
pub fn generate_filename(url: &str) -> String {
    format!(
        "fetched_content_{}_{}.html",
        basename(url),
        Uuid::new_v4().simple()
    )
}

fn basename(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .or_else(|| parsed.host_str().map(str::to_string)),
        Err(_) => None,
    };

    let sanitized: String = raw
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASENAME_LEN)
        .collect();

    if sanitized.is_empty() {
        "page".to_string()
    } else {
        sanitized
    }
}
