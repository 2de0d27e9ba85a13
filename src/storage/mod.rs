//! Storage module for persisting audits
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and forward-only migrations
//! - Audit record creation and lifecycle transitions
//! - The results blob (feature set, scores, suggestions or error)
//! - Listing and counting for history and statistics

mod schema;
mod sqlite;
mod traits;

pub use schema::{apply_migrations, schema_version, MIGRATIONS};
pub use sqlite::SqliteStorage;
pub use traits::{AuditStore, ScoreAverages, StorageError, StorageResult};

use crate::audit::AuditResult;
use crate::state::AuditStatus;
use crate::suggest::SuggestionSet;
use serde::{Deserialize, Serialize};

/// Structured blob stored in the `results_data` column
///
/// A completed audit carries `audit` and, once generated, `suggestions`. A
/// failed audit carries `error` and the `url` it was started for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<SuggestionSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ResultsData {
    pub fn completed(result: AuditResult) -> Self {
        Self {
            audit: Some(result),
            ..Default::default()
        }
    }

    pub fn failed(url: &str, message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }
}

/// Represents an audit in the database
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub url: String,
    /// Creation time, RFC 3339
    pub timestamp: String,
    pub title: Option<String>,
    pub score_seo: u32,
    pub score_performance: u32,
    pub score_security: u32,
    pub broken_links: u32,
    pub results: Option<ResultsData>,
    pub status: AuditStatus,
}

impl AuditRecord {
    /// The scored result, present once the audit completed
    pub fn audit_result(&self) -> Option<&AuditResult> {
        self.results.as_ref().and_then(|r| r.audit.as_ref())
    }

    /// Attached suggestions, if any were generated
    pub fn suggestions(&self) -> Option<&SuggestionSet> {
        self.results.as_ref().and_then(|r| r.suggestions.as_ref())
    }

    /// The error message of a failed audit
    pub fn error_message(&self) -> Option<&str> {
        self.results.as_ref().and_then(|r| r.error.as_deref())
    }

    pub fn has_results(&self) -> bool {
        self.audit_result().is_some()
    }
}
