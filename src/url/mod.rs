//! URL handling module for Site-Audit
//!
//! This module provides input normalization, attribute resolution and
//! host-based classification of discovered URLs.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use normalize::{normalize_input, resolve_href};

/// Where a discovered URL points relative to the audited page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same host as the audited page, or no host at all
    Internal,
    /// A different host
    External,
}

impl LinkScope {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a resolved URL against the audited page
///
/// URLs without a host (`mailto:`, `javascript:` and similar) count as
/// internal: they do not send the visitor to another site.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_audit::url::{classify_link, LinkScope};
///
/// let page = Url::parse("https://example.com/").unwrap();
/// let other = Url::parse("https://cdn.example.net/app.js").unwrap();
/// assert_eq!(classify_link(&page, &other), LinkScope::External);
/// ```
pub fn classify_link(page: &Url, target: &Url) -> LinkScope {
    match target.host_str() {
        None => LinkScope::Internal,
        Some(_) if same_host(page, target) => LinkScope::Internal,
        Some(_) => LinkScope::External,
    }
}

/// Returns true when the URL can be probed over HTTP
pub fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
