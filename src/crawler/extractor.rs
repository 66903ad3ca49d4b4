//! Link extraction from raw HTML
//!
//! Links are found by matching `href` attributes directly in the page text
//! rather than by building a DOM. That keeps extraction infallible on broken
//! markup, at the cost of two known gaps:
//! - links assembled by scripts are never seen
//! - `href` attributes inside comments or script strings are picked up

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

/// `href` followed by a double-quoted, single-quoted or bare value.
/// The leading class keeps `data-href` and friends out.
static HREF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|[^\w-])href\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s"'<>]+))"#)
        .expect("href pattern is valid")
});

/// Lazy iterator over the raw `href` values of one document
///
/// Yielded values are verbatim slices of the input: entities are not decoded
/// and relative links are not resolved.
pub struct Links<'h> {
    captures: CaptureMatches<'static, 'h>,
}

impl<'h> Iterator for Links<'h> {
    type Item = &'h str;

    fn next(&mut self) -> Option<Self::Item> {
        self.captures.by_ref().find_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
        })
    }
}

/// Scans an HTML payload for hyperlink attributes
///
/// Values are yielded in document order, duplicates included. A page with no
/// links yields an empty sequence; there is no failure case.
///
/// # Example
///
/// ```
/// use sumi_reach::crawler::extract_links;
///
/// let html = r#"<a href="https://x.com/1"> <a href='/2'>"#;
/// let links: Vec<&str> = extract_links(html).collect();
/// assert_eq!(links, vec!["https://x.com/1", "/2"]);
/// ```
pub fn extract_links(html: &str) -> Links<'_> {
    Links {
        captures: HREF_PATTERN.captures_iter(html),
    }
}
