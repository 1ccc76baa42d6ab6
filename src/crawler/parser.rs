//! HTML link extraction
//!
//! Pulls every `<a href>` out of a page, resolves it against the page URL and
//! keeps only absolute `http`/`https` links.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the set of absolute outbound links from an HTML document
///
/// # Example
///
/// ```
/// use ripple_rank::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base);
/// assert!(links.contains("https://example.com/page"));
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> HashSet<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return HashSet::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href to an absolute URL, dropping anything that is not HTTP(S)
///
/// Fragments are stripped so `/page#top` and `/page` are the same link.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if !matches!(absolute.scheme(), "http" | "https") {
        return None;
    }
    absolute.set_fragment(None);

    Some(absolute.to_string())
}
