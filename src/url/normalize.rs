use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes the crawler is able to fetch
const CRAWLABLE_SCHEMES: &[&str] = &["http", "https"];

/// Resolves a possibly-relative link against the URL of the page it came from
///
/// # Resolution Rules
///
/// 1. Parse `base`; reject if malformed
/// 2. Join `reference` onto `base` following RFC 3986 base-URL resolution:
///    - an absolute reference replaces the base entirely
///    - scheme-relative (`//host/path`), absolute-path and relative-path
///      references borrow the missing parts from the base
///    - `.` and `..` segments are collapsed
///    - query and fragment of the reference are kept as-is
/// 3. Reject anything that did not end up as an http(s) URL with a host
///
/// The result is the standard serialized form, so the same target always
/// produces the same string (e.g. `https://Example.com` → `https://example.com/`).
///
/// # Arguments
///
/// * `base` - Absolute URL of the page containing the link
/// * `reference` - The raw link as it appeared in the page
///
/// # Returns
///
/// * `Ok(String)` - Absolute, canonical URL
/// * `Err(UrlError)` - Link cannot be crawled and should be skipped
///
/// # Examples
///
/// ```
/// use sumi_reach::url::resolve;
///
/// assert_eq!(resolve("https://a.com/x/y", "../z").unwrap(), "https://a.com/z");
/// assert_eq!(
///     resolve("https://a.com/x/y", "https://b.com/page?q=1").unwrap(),
///     "https://b.com/page?q=1"
/// );
/// ```
pub fn resolve(base: &str, reference: &str) -> UrlResult<String> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;

    let resolved = base_url
        .join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    ensure_crawlable(&resolved)?;

    Ok(resolved.into())
}

/// Brings a seed URL into the same canonical form as resolved links
///
/// Seeds and discovered links must serialize identically, otherwise a page
/// linking back to its seed would be crawled twice.
pub fn normalize_seed(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    ensure_crawlable(&parsed)?;
    Ok(parsed.into())
}

fn ensure_crawlable(url: &Url) -> UrlResult<()> {
    if !CRAWLABLE_SCHEMES.contains(&url.scheme()) {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    Ok(())
}
