//! Site-Audit: single-page SEO, performance and security auditing
//!
//! This crate fetches one web page, extracts SEO/performance/security signals,
//! checks a bounded sample of its links, scores the result, persists it and
//! produces remediation suggestions (from a language model when one is
//! configured, from deterministic rules otherwise).

pub mod audit;
pub mod config;
pub mod output;
pub mod service;
pub mod state;
pub mod storage;
pub mod suggest;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit not found: {0}")]
    AuditNotFound(i64),

    #[error("Audit {id} is not ready (status: {status})")]
    NotReady { id: i64, status: state::AuditStatus },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: state::AuditStatus,
        to: state::AuditStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Site-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use audit::{AuditResult, Auditor, LinkCounts, Scores};
pub use config::Config;
pub use service::AuditService;
pub use state::AuditStatus;
pub use suggest::{Category, Suggestion, SuggestionEngine, SuggestionSet};
pub use url::normalize_input;
