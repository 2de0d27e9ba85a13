//! HTTP fetcher implementation
//!
//! This module handles all HTTP traffic of an audit:
//! - Building the HTTP clients with the configured user agent
//! - The single authoritative GET of the audited page
//! - HEAD probes for sitemap/robots.txt reachability, resource sizes and
//!   link liveness
//!
//! Probe failures never escape this module as errors: a probe that cannot
//! complete yields `None` and the caller applies its negative default.

use crate::config::FetcherConfig;
use crate::AuditError;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// The fetched page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects; relative URLs resolve against this
    pub final_url: Url,
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Response headers of the final response
    pub headers: HeaderMap,
    /// Decoded page body
    pub body: String,
    /// Body size in bytes
    pub byte_len: usize,
}

/// Outcome of a HEAD probe that got a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status_code: u16,
    /// `Content-Length` header value, when present and numeric
    pub content_length: Option<u64>,
}

impl ProbeResponse {
    /// A link is working iff its status is in `[200, 400)`
    pub fn is_working(&self) -> bool {
        (200..400).contains(&self.status_code)
    }

    /// Sitemap and robots.txt count as available only on a plain 200
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// HTTP clients used by one auditor
///
/// Probes run on a client without transparent decompression: with it,
/// compressed HEAD responses lose their `Content-Length` header, and the
/// byte size is the thing being probed.
#[derive(Debug, Clone)]
pub struct HttpClients {
    pub page: Client,
    pub probe: Client,
    pub page_timeout: Duration,
    pub probe_timeout: Duration,
}

/// Builds the page and probe clients from the fetcher configuration
///
/// # Example
///
/// ```no_run
/// use site_audit::config::FetcherConfig;
/// use site_audit::audit::build_http_clients;
///
/// let clients = build_http_clients(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_clients(config: &FetcherConfig) -> Result<HttpClients, reqwest::Error> {
    let page = Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()?;

    let probe = Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(Policy::limited(config.max_redirects))
        .no_gzip()
        .no_brotli()
        .build()?;

    Ok(HttpClients {
        page,
        probe,
        page_timeout: Duration::from_secs(config.page_timeout_secs),
        probe_timeout: Duration::from_secs(config.probe_timeout_secs),
    })
}

/// Fetches the audited page
///
/// Redirects are followed. Network failures, timeouts and a final status of
/// 400 or above are fatal to the audit and come back as
/// [`AuditError::Fetch`] carrying the cause.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<RawPage, AuditError> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| fetch_error(url, &e))?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(AuditError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    let final_url = response.url().clone();
    let headers = response.headers().clone();
    let bytes = response.bytes().await.map_err(|e| fetch_error(url, &e))?;

    tracing::debug!(
        "Fetched {} ({} bytes, final URL {})",
        url,
        bytes.len(),
        final_url
    );

    Ok(RawPage {
        final_url,
        status_code: status.as_u16(),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        byte_len: bytes.len(),
    })
}

/// Sends a HEAD request, following redirects
///
/// Returns `None` on any failure (timeout, DNS, connection refused, TLS).
pub async fn probe(client: &Client, url: &Url, timeout: Duration) -> Option<ProbeResponse> {
    match client.head(url.clone()).timeout(timeout).send().await {
        Ok(response) => Some(ProbeResponse {
            status_code: response.status().as_u16(),
            content_length: content_length(response.headers()),
        }),
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            None
        }
    }
}

/// Probes a resource and returns its advertised size in bytes
///
/// Any failure or a missing header reads as zero.
pub async fn probe_size(client: &Client, url: &Url, timeout: Duration) -> u64 {
    probe(client, url, timeout)
        .await
        .and_then(|response| response.content_length)
        .unwrap_or(0)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn fetch_error(url: &Url, error: &reqwest::Error) -> AuditError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    };

    AuditError::Fetch {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_build_http_clients() {
        let clients = build_http_clients(&FetcherConfig::default()).unwrap();
        assert_eq!(clients.page_timeout, Duration::from_secs(10));
        assert_eq!(clients.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_working_status_boundaries() {
        let at = |status_code| ProbeResponse {
            status_code,
            content_length: None,
        };
        assert!(!at(199).is_working());
        assert!(at(200).is_working());
        assert!(at(399).is_working());
        assert!(!at(400).is_working());
        assert!(!at(499).is_working());
        assert!(!at(500).is_working());
    }

    #[test]
    fn test_is_ok_requires_200() {
        let response = ProbeResponse {
            status_code: 204,
            content_length: None,
        };
        assert!(!response.is_ok());
        assert!(ProbeResponse {
            status_code: 200,
            content_length: None
        }
        .is_ok());
    }

    #[test]
    fn test_content_length_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
        assert_eq!(content_length(&headers), Some(2048));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("abc"));
        assert_eq!(content_length(&headers), None);
    }

    #[tokio::test]
    async fn test_probe_unreachable_host_is_none() {
        let clients = build_http_clients(&FetcherConfig::default()).unwrap();
        // Port 9 on localhost (discard) is closed on test machines
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = probe(&clients.probe, &url, Duration::from_secs(2)).await;
        assert!(result.is_none());
        assert_eq!(probe_size(&clients.probe, &url, Duration::from_secs(2)).await, 0);
    }
}
