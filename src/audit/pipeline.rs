//! Audit pipeline - one page from URL to scored result
//!
//! This module sequences one audit run:
//! - Normalizing the input and fetching the page
//! - Extracting signals from the HTML
//! - Running every auxiliary HEAD probe and the link check concurrently
//! - Assembling the feature set and scoring it
//!
//! Only the page fetch can fail the run. Every probe degrades to its
//! negative default on its own.

use crate::audit::extractor::{extract_with_limit, ExtractedPage};
use crate::audit::fetcher::{build_http_clients, fetch_page, probe, probe_size, HttpClients, RawPage};
use crate::audit::links::{check_links, LinkCheckSummary};
use crate::audit::model::{
    bytes_to_kb, AuditResult, FeatureSet, LcpCandidate, LengthBand, LinkCounts,
    PerformanceFeatures, SecurityHeaders, SeoFeatures, META_IDEAL, TITLE_IDEAL,
};
use crate::config::{Config, LinksConfig};
use crate::url::normalize_input;
use crate::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Runs audits with a fixed pair of HTTP clients
#[derive(Debug, Clone)]
pub struct Auditor {
    clients: HttpClients,
    links: LinksConfig,
}

/// Results of the auxiliary probes of one run
#[derive(Debug, Default)]
struct ProbeResults {
    sitemap_available: bool,
    robots_available: bool,
    js_bytes: u64,
    css_bytes: u64,
    /// Largest image with a positive size, first in document order on ties
    largest_image: Option<(Url, u64)>,
    links: LinkCheckSummary,
}

impl Auditor {
    /// Creates an auditor from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let clients = build_http_clients(&config.fetcher)?;
        Ok(Self {
            clients,
            links: config.links.clone(),
        })
    }

    /// Runs the pipeline and returns the raw feature set
    ///
    /// # Errors
    ///
    /// Fails when the input is not a usable URL or when the page fetch
    /// fails (network error, timeout, final status of 400 or above).
    pub async fn run_audit(&self, input: &str) -> Result<FeatureSet> {
        let url = normalize_input(input)?;
        let start_time = Instant::now();
        tracing::info!("Auditing {}", url);

        let page = fetch_page(&self.clients.page, &url, self.clients.page_timeout).await?;
        let extracted = extract_with_limit(&page.body, &page.final_url, self.links.sample_size);

        tracing::debug!(
            "Extracted {} scripts, {} stylesheets, {} images, {} sampled links from {}",
            extracted.script_urls.len(),
            extracted.stylesheet_urls.len(),
            extracted.image_urls.len(),
            extracted.link_sample.len(),
            page.final_url
        );

        let probes = self.run_probes(&page.final_url, &extracted).await;
        let features = assemble(&url, &page, extracted, probes);

        tracing::info!(
            "Audit of {} finished in {:?}: {} working / {} broken links",
            url,
            start_time.elapsed(),
            features.links.working_links,
            features.links.broken_links
        );

        Ok(features)
    }

    /// Runs the pipeline and scores the result
    pub async fn audit(&self, input: &str) -> Result<AuditResult> {
        let features = self.run_audit(input).await?;
        Ok(AuditResult::from_features(features))
    }

    async fn run_probes(&self, base: &Url, page: &ExtractedPage) -> ProbeResults {
        let client = &self.clients.probe;
        let timeout = self.clients.probe_timeout;
        let limit = self.links.max_concurrent_checks;

        let sitemap = async {
            match base.join("/sitemap.xml") {
                Ok(url) => probe(client, &url, timeout).await.map_or(false, |r| r.is_ok()),
                Err(_) => false,
            }
        };
        let robots = async {
            match base.join("/robots.txt") {
                Ok(url) => probe(client, &url, timeout).await.map_or(false, |r| r.is_ok()),
                Err(_) => false,
            }
        };

        let (sitemap_available, robots_available, js_sizes, css_sizes, image_sizes, links) = tokio::join!(
            sitemap,
            robots,
            probe_sizes(client, &page.script_urls, limit, timeout),
            probe_sizes(client, &page.stylesheet_urls, limit, timeout),
            probe_sizes(client, &page.image_urls, limit, timeout),
            check_links(
                client,
                page.link_sample.clone(),
                self.links.max_concurrent_checks,
                timeout
            ),
        );

        let mut largest_image: Option<(Url, u64)> = None;
        for (url, size) in page.image_urls.iter().zip(image_sizes) {
            if size > largest_image.as_ref().map_or(0, |(_, best)| *best) {
                largest_image = Some((url.clone(), size));
            }
        }

        ProbeResults {
            sitemap_available,
            robots_available,
            js_bytes: js_sizes.iter().sum(),
            css_bytes: css_sizes.iter().sum(),
            largest_image,
            links,
        }
    }
}

/// Probes every URL's size with at most `max_concurrent` requests in
/// flight, returning sizes in input order
async fn probe_sizes(
    client: &Client,
    urls: &[Url],
    max_concurrent: usize,
    timeout: Duration,
) -> Vec<u64> {
    let mut sizes = vec![0; urls.len()];
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.iter().enumerate() {
        let client = client.clone();
        let url = url.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (index, 0);
            };
            (index, probe_size(&client, &url, timeout).await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, size)) => sizes[index] = size,
            Err(e) => tracing::warn!("Size probe task failed: {}", e),
        }
    }

    sizes
}

fn assemble(url: &Url, page: &RawPage, extracted: ExtractedPage, probes: ProbeResults) -> FeatureSet {
    let title_length = extracted.title.as_deref().map_or(0, |t| t.chars().count());
    let meta_length = extracted
        .meta_description
        .as_deref()
        .map_or(0, |m| m.chars().count());

    let seo = SeoFeatures {
        has_title: extracted.title.is_some(),
        title: extracted.title,
        title_length,
        title_status: LengthBand::classify(title_length, TITLE_IDEAL),
        has_meta_description: extracted.meta_description.is_some(),
        meta_description: extracted.meta_description,
        meta_length,
        meta_status: LengthBand::classify(meta_length, META_IDEAL),
        h1_count: extracted.h1_count,
        h2_count: extracted.h2_count,
        h3_count: extracted.h3_count,
        img_count: extracted.img_count,
        missing_alt: extracted.missing_alt,
        canonical_present: extracted.canonical_present,
        robots_meta: extracted.robots_meta_present,
        sitemap_available: probes.sitemap_available,
        robots_available: probes.robots_available,
    };

    let lcp_candidate = match (&probes.largest_image, extracted.has_video) {
        (Some((image, _)), _) => LcpCandidate::Image(image.to_string()),
        (None, true) => LcpCandidate::Video,
        (None, false) => LcpCandidate::NotDetected,
    };

    let performance = PerformanceFeatures {
        page_size_kb: bytes_to_kb(page.byte_len as u64),
        js_count: extracted.script_urls.len(),
        js_files: extracted.script_urls.iter().map(Url::to_string).collect(),
        js_size_kb: bytes_to_kb(probes.js_bytes),
        css_count: extracted.stylesheet_urls.len(),
        css_files: extracted.stylesheet_urls.iter().map(Url::to_string).collect(),
        css_size_kb: bytes_to_kb(probes.css_bytes),
        external_scripts: extracted.external_scripts,
        largest_image_url: probes.largest_image.as_ref().map(|(image, _)| image.to_string()),
        largest_image_kb: bytes_to_kb(probes.largest_image.as_ref().map_or(0, |(_, size)| *size)),
        has_video: extracted.has_video,
        lcp_candidate,
    };

    let security_headers = SecurityHeaders::from_lookup(|name| page.headers.contains_key(name));

    FeatureSet {
        url: url.to_string(),
        final_url: page.final_url.to_string(),
        seo,
        performance,
        security_headers,
        links: LinkCounts {
            working_links: probes.links.working,
            broken_links: probes.links.broken,
            internal_links: extracted.internal_links,
            external_links: extracted.external_links,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn raw_page(headers: HeaderMap, byte_len: usize) -> RawPage {
        RawPage {
            final_url: Url::parse("https://example.com/").unwrap(),
            status_code: 200,
            headers,
            body: String::new(),
            byte_len,
        }
    }

    #[test]
    fn test_auditor_from_default_config() {
        assert!(Auditor::new(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_fetch() {
        let auditor = Auditor::new(&Config::default()).unwrap();
        assert!(auditor.run_audit("   ").await.is_err());
    }

    #[test]
    fn test_assemble_lengths_and_bands() {
        let url = Url::parse("https://example.com/").unwrap();
        let extracted = ExtractedPage {
            title: Some("Short".to_string()),
            meta_description: Some("é".repeat(130)),
            ..Default::default()
        };
        let features = assemble(&url, &raw_page(HeaderMap::new(), 2048), extracted, ProbeResults::default());

        assert!(features.seo.has_title);
        assert_eq!(features.seo.title_length, 5);
        assert_eq!(features.seo.title_status, LengthBand::TooShort);
        assert_eq!(features.seo.meta_length, 130);
        assert_eq!(features.seo.meta_status, LengthBand::Ideal);
        assert_eq!(features.performance.page_size_kb, 2.0);
    }

    #[test]
    fn test_assemble_missing_title() {
        let url = Url::parse("https://example.com/").unwrap();
        let features = assemble(
            &url,
            &raw_page(HeaderMap::new(), 0),
            ExtractedPage::default(),
            ProbeResults::default(),
        );
        assert!(!features.seo.has_title);
        assert_eq!(features.seo.title_length, 0);
        assert_eq!(features.seo.title_status, LengthBand::TooShort);
        assert_eq!(features.performance.lcp_candidate, LcpCandidate::NotDetected);
    }

    #[test]
    fn test_assemble_lcp_prefers_image_over_video() {
        let url = Url::parse("https://example.com/").unwrap();
        let hero = Url::parse("https://example.com/hero.jpg").unwrap();
        let extracted = ExtractedPage {
            has_video: true,
            ..Default::default()
        };
        let probes = ProbeResults {
            largest_image: Some((hero.clone(), 4096)),
            ..Default::default()
        };
        let features = assemble(&url, &raw_page(HeaderMap::new(), 0), extracted.clone(), probes);
        assert_eq!(
            features.performance.lcp_candidate,
            LcpCandidate::Image(hero.to_string())
        );
        assert_eq!(features.performance.largest_image_kb, 4.0);

        let features = assemble(&url, &raw_page(HeaderMap::new(), 0), extracted, ProbeResults::default());
        assert_eq!(features.performance.lcp_candidate, LcpCandidate::Video);
        assert_eq!(features.performance.largest_image_url, None);
    }

    #[test]
    fn test_assemble_security_headers_case_insensitive() {
        let url = Url::parse("https://example.com/").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        headers.insert("strict-transport-security", HeaderValue::from_static("max-age=1"));
        let features = assemble(&url, &raw_page(headers, 0), ExtractedPage::default(), ProbeResults::default());

        assert!(features.security_headers.x_frame_options);
        assert!(features.security_headers.strict_transport_security);
        assert!(!features.security_headers.content_security_policy);
    }

    #[tokio::test]
    async fn test_probe_sizes_keeps_order_for_unreachable() {
        let client = Client::new();
        let urls = vec![
            Url::parse("http://127.0.0.1:9/a.js").unwrap(),
            Url::parse("http://127.0.0.1:9/b.js").unwrap(),
        ];
        let sizes = probe_sizes(&client, &urls, 1, Duration::from_secs(2)).await;
        assert_eq!(sizes, vec![0, 0]);
    }

    #[tokio::test]
    async fn test_probe_sizes_respects_concurrency_limit() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
            .mount(&server)
            .await;

        let urls: Vec<Url> = (0..4)
            .map(|i| Url::parse(&format!("{}/img{}.png", server.uri(), i)).unwrap())
            .collect();

        let start = Instant::now();
        let sizes = probe_sizes(&Client::new(), &urls, 1, Duration::from_secs(5)).await;
        assert_eq!(sizes.len(), 4);
        // One request at a time: four delays back to back
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
