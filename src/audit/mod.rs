//! Audit module - fetching, extraction, link checking and scoring
//!
//! This module contains the core audit pipeline:
//! - `fetcher`: the page GET and the HEAD probes
//! - `extractor`: HTML parsing into audit signals
//! - `links`: bounded-concurrency link liveness checks
//! - `scoring`: pure 0-100 scoring functions
//! - `pipeline`: the `Auditor` sequencing one run
//! - `model`: the feature set and score types

mod extractor;
mod fetcher;
mod links;
mod model;
mod pipeline;
pub mod scoring;

pub use extractor::{extract, extract_with_limit, ExtractedPage, LINK_SAMPLE_SIZE};
pub use fetcher::{
    build_http_clients, fetch_page, probe, probe_size, HttpClients, ProbeResponse, RawPage,
};
pub use links::{check_links, check_links_with, LinkCheckSummary};
pub use model::{
    bytes_to_kb, AuditResult, FeatureSet, LcpCandidate, LengthBand, LinkCounts,
    PerformanceFeatures, Scores, SecurityHeaders, SeoFeatures, META_IDEAL, SECURITY_HEADERS,
    TITLE_IDEAL,
};
pub use pipeline::Auditor;
pub use scoring::score;
