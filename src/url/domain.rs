use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_audit::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs have the same host
///
/// Ports and schemes are ignored: `http://a.com` and `https://a.com:8443`
/// share a host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_host_with_port() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_host(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_hostless_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(extract_host(&url), None);
    }

    #[test]
    fn test_same_host_ignores_scheme_and_port() {
        let a = Url::parse("http://example.com/").unwrap();
        let b = Url::parse("https://EXAMPLE.com:8443/x").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_different_hosts() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://cdn.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }
}
