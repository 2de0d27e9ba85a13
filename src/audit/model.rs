//! Audit data model
//!
//! `FeatureSet` is everything measured about one page. `Scores` are derived
//! from it by the pure functions in [`crate::audit::scoring`] and can be
//! recomputed from a stored feature set at any time.

use serde::{Deserialize, Serialize};

/// Ideal title length range (characters, inclusive)
pub const TITLE_IDEAL: (usize, usize) = (30, 60);

/// Ideal meta description length range (characters, inclusive)
pub const META_IDEAL: (usize, usize) = (120, 160);

/// Classification of a text length against an ideal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthBand {
    #[serde(rename = "ideal")]
    Ideal,
    #[default]
    #[serde(rename = "too short")]
    TooShort,
    #[serde(rename = "too long")]
    TooLong,
}

impl LengthBand {
    /// Bands `len` against the inclusive range `[min, max]`
    pub fn classify(len: usize, (min, max): (usize, usize)) -> Self {
        if len < min {
            Self::TooShort
        } else if len > max {
            Self::TooLong
        } else {
            Self::Ideal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ideal => "ideal",
            Self::TooShort => "too short",
            Self::TooLong => "too long",
        }
    }
}

/// Coarse stand-in for a Largest Contentful Paint measurement
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum LcpCandidate {
    /// The largest image found by the size probes
    Image(String),
    /// No sized image, but the page has a `<video>` element
    Video,
    #[default]
    NotDetected,
}

impl LcpCandidate {
    pub fn label(&self) -> String {
        match self {
            Self::Image(url) => url.clone(),
            Self::Video => "video element found".to_string(),
            Self::NotDetected => "Not detected".to_string(),
        }
    }
}

/// SEO signals extracted from the page and its site
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeoFeatures {
    pub title: Option<String>,
    pub has_title: bool,
    pub title_length: usize,
    pub title_status: LengthBand,
    pub meta_description: Option<String>,
    pub has_meta_description: bool,
    pub meta_length: usize,
    pub meta_status: LengthBand,
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub img_count: usize,
    pub missing_alt: usize,
    pub canonical_present: bool,
    pub robots_meta: bool,
    pub sitemap_available: bool,
    pub robots_available: bool,
}

/// Resource weight signals
///
/// Sizes are in KB (1024 bytes) rounded to two decimals, summed from
/// `Content-Length` headers; resources that report no length count as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceFeatures {
    pub page_size_kb: f64,
    pub js_files: Vec<String>,
    pub js_count: usize,
    pub js_size_kb: f64,
    pub css_files: Vec<String>,
    pub css_count: usize,
    pub css_size_kb: f64,
    pub external_scripts: usize,
    pub largest_image_url: Option<String>,
    pub largest_image_kb: f64,
    pub has_video: bool,
    pub lcp_candidate: LcpCandidate,
}

/// Security header names checked on the page response, in report order
pub const SECURITY_HEADERS: [&str; 5] = [
    "Content-Security-Policy",
    "X-Frame-Options",
    "X-Content-Type-Options",
    "Referrer-Policy",
    "Strict-Transport-Security",
];

/// Presence of each checked security header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecurityHeaders {
    #[serde(rename = "Content-Security-Policy")]
    pub content_security_policy: bool,
    #[serde(rename = "X-Frame-Options")]
    pub x_frame_options: bool,
    #[serde(rename = "X-Content-Type-Options")]
    pub x_content_type_options: bool,
    #[serde(rename = "Referrer-Policy")]
    pub referrer_policy: bool,
    #[serde(rename = "Strict-Transport-Security")]
    pub strict_transport_security: bool,
}

impl SecurityHeaders {
    /// Builds the presence map by asking `has` about each header name
    pub fn from_lookup(has: impl Fn(&str) -> bool) -> Self {
        Self {
            content_security_policy: has(SECURITY_HEADERS[0]),
            x_frame_options: has(SECURITY_HEADERS[1]),
            x_content_type_options: has(SECURITY_HEADERS[2]),
            referrer_policy: has(SECURITY_HEADERS[3]),
            strict_transport_security: has(SECURITY_HEADERS[4]),
        }
    }

    /// Header names paired with their presence, in [`SECURITY_HEADERS`] order
    pub fn entries(&self) -> [(&'static str, bool); 5] {
        [
            (SECURITY_HEADERS[0], self.content_security_policy),
            (SECURITY_HEADERS[1], self.x_frame_options),
            (SECURITY_HEADERS[2], self.x_content_type_options),
            (SECURITY_HEADERS[3], self.referrer_policy),
            (SECURITY_HEADERS[4], self.strict_transport_security),
        ]
    }

    pub fn present_count(&self) -> usize {
        self.entries().iter().filter(|(_, present)| *present).count()
    }
}

/// Link health and legacy link counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkCounts {
    /// Sampled links answering with a status in `[200, 400)`
    pub working_links: usize,
    /// Sampled links that failed or answered with any other status
    pub broken_links: usize,
    /// All anchors pointing at the page's own host (not deduplicated)
    pub internal_links: usize,
    /// All anchors pointing at another host (not deduplicated)
    pub external_links: usize,
}

/// Everything measured about one audited page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Normalized input URL
    pub url: String,
    /// URL the page was served from after redirects
    pub final_url: String,
    pub seo: SeoFeatures,
    pub performance: PerformanceFeatures,
    pub security_headers: SecurityHeaders,
    pub links: LinkCounts,
}

/// The three 0-100 scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub seo: u32,
    pub performance: u32,
    pub security: u32,
}

/// A completed pipeline run: the feature set plus its scores
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(flatten)]
    pub features: FeatureSet,
    pub scores: Scores,
}

impl AuditResult {
    /// Scores the feature set and wraps both
    pub fn from_features(features: FeatureSet) -> Self {
        let scores = crate::audit::scoring::score(&features);
        Self { features, scores }
    }
}

/// Converts a byte count to KB rounded to two decimals
pub fn bytes_to_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}
