//! Configuration module for Site-Audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted keys take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use site_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Links sampled per audit: {}", config.links.sample_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, LinksConfig, OutputConfig, SuggestionsConfig,
    DEFAULT_SUGGESTIONS_ENDPOINT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
