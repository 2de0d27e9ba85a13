use crate::UrlError;
use url::Url;

/// Normalizes user input into a scheme-qualified URL
///
/// Input without an `http://` or `https://` prefix is treated as an HTTPS
/// address. Nothing else about the URL is rewritten: the host, path and
/// query are kept as given so that the audit targets exactly the page the
/// user asked for.
///
/// # Examples
///
/// ```
/// use site_audit::url::normalize_input;
///
/// let url = normalize_input("example.com/about").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
///
/// let url = normalize_input("http://example.com/").unwrap();
/// assert_eq!(url.scheme(), "http");
/// ```
pub fn normalize_input(input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let lowered = input.to_ascii_lowercase();
    let qualified = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&qualified).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves an `href`/`src` attribute against the page URL
///
/// The fragment is dropped so that `page#a` and `page#b` resolve to the same
/// address. Returns `None` for empty attributes and values that cannot be
/// joined onto the base.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}
