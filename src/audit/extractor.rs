//! HTML extractor for audit signals
//!
//! This module parses the fetched page and pulls out:
//! - Title, meta description and heading counts
//! - Images and missing alt text
//! - Canonical link and robots meta presence
//! - Script and stylesheet inventories
//! - Anchor links, both as a liveness sample and as internal/external counts
//!
//! Extraction is a pure parse. It performs no network I/O; the URLs it
//! collects are probed later by the pipeline.

use crate::url::{classify_link, is_http, resolve_href, same_host};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Default number of distinct links kept for the liveness check
pub const LINK_SAMPLE_SIZE: usize = 40;

/// Signals extracted from one HTML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    /// Text of the first `<title>`, trimmed; `None` when absent or empty
    pub title: Option<String>,

    /// `meta[name=description]` content, falling back to `og:description`
    pub meta_description: Option<String>,

    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,

    /// Number of `<img>` elements
    pub img_count: usize,

    /// Images whose `alt` attribute is absent or empty
    pub missing_alt: usize,

    /// Resolved HTTP(S) image sources, in document order
    pub image_urls: Vec<Url>,

    pub canonical_present: bool,
    pub robots_meta_present: bool,
    pub has_video: bool,

    /// Resolved `<script src>` URLs (inline scripts excluded)
    pub script_urls: Vec<Url>,

    /// Resolved `<link rel=stylesheet>` URLs
    pub stylesheet_urls: Vec<Url>,

    /// Scripts served from a host other than the page's
    pub external_scripts: usize,

    /// Distinct anchor targets among the first N anchors, fragment stripped,
    /// in document order; non-HTTP targets are kept
    pub link_sample: Vec<Url>,

    /// Every anchor pointing at the page's host
    pub internal_links: usize,

    /// Every anchor pointing at another host
    pub external_links: usize,
}

/// Extracts audit signals with the default link sample size
///
/// # Example
///
/// ```
/// use site_audit::audit::extract;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let page = extract(html, &base_url);
/// assert_eq!(page.title, Some("Test".to_string()));
/// assert_eq!(page.link_sample.len(), 1);
/// ```
pub fn extract(html: &str, base_url: &Url) -> ExtractedPage {
    extract_with_limit(html, base_url, LINK_SAMPLE_SIZE)
}

/// Extracts audit signals, sampling links from the first `sample_size`
/// anchors for the liveness check
///
/// `base_url` must be the URL the page was finally served from so that
/// relative references resolve the way a browser would resolve them.
pub fn extract_with_limit(html: &str, base_url: &Url, sample_size: usize) -> ExtractedPage {
    let document = Html::parse_document(html);

    let (img_count, missing_alt, image_urls) = extract_images(&document, base_url);
    let script_urls = collect_urls(&document, "script[src]", "src", base_url);
    let external_scripts = script_urls
        .iter()
        .filter(|script| !same_host(script, base_url))
        .count();
    let (link_sample, internal_links, external_links) =
        extract_links(&document, base_url, sample_size);

    ExtractedPage {
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        h1_count: count(&document, "h1"),
        h2_count: count(&document, "h2"),
        h3_count: count(&document, "h3"),
        img_count,
        missing_alt,
        image_urls,
        canonical_present: count(&document, "link[rel~='canonical']") > 0,
        robots_meta_present: count(&document, "meta[name='robots']") > 0,
        has_video: count(&document, "video") > 0,
        script_urls,
        stylesheet_urls: collect_urls(&document, "link[rel~='stylesheet']", "href", base_url),
        external_scripts,
        link_sample,
        internal_links,
        external_links,
    }
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn count(document: &Html, css: &str) -> usize {
    select(document, css).len()
}

fn extract_title(document: &Html) -> Option<String> {
    select(document, "title")
        .first()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_meta_description(document: &Html) -> Option<String> {
    // The og:description fallback applies only when no description tag exists
    let element = select(document, "meta[name='description']")
        .into_iter()
        .next()
        .or_else(|| {
            select(document, "meta[property='og:description']")
                .into_iter()
                .next()
        })?;

    element
        .value()
        .attr("content")
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_images(document: &Html, base_url: &Url) -> (usize, usize, Vec<Url>) {
    let images = select(document, "img");
    let missing_alt = images
        .iter()
        .filter(|img| img.value().attr("alt").map_or(true, str::is_empty))
        .count();
    let urls = images
        .iter()
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| resolve_href(base_url, src))
        .filter(is_http)
        .collect();

    (images.len(), missing_alt, urls)
}

fn collect_urls(document: &Html, css: &str, attr: &str, base_url: &Url) -> Vec<Url> {
    select(document, css)
        .iter()
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve_href(base_url, value))
        .collect()
}

/// Walks every `<a href>` once, producing the liveness sample and the
/// untruncated internal/external counts
///
/// The sample covers the first `sample_size` anchors in document order,
/// deduplicated within that window. Non-HTTP targets stay in it and are
/// reported broken by the link check.
fn extract_links(document: &Html, base_url: &Url, sample_size: usize) -> (Vec<Url>, usize, usize) {
    let mut sample = Vec::new();
    let mut seen = HashSet::new();
    let mut internal = 0;
    let mut external = 0;

    for (position, element) in select(document, "a[href]").into_iter().enumerate() {
        let Some(resolved) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(base_url, href))
        else {
            continue;
        };

        if classify_link(base_url, &resolved).is_internal() {
            internal += 1;
        } else {
            external += 1;
        }

        if position < sample_size && seen.insert(resolved.to_string()) {
            sample.push(resolved);
        }
    }

    (sample, internal, external)
}
