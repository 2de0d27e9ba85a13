//! Storage traits and error types
//!
//! This module defines the trait interface for audit stores and the
//! associated error types.

use crate::audit::AuditResult;
use crate::state::AuditStatus;
use crate::storage::AuditRecord;
use crate::suggest::SuggestionSet;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Audit not found: {0}")]
    AuditNotFound(i64),

    #[error("Invalid status transition for audit {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: AuditStatus,
        to: AuditStatus,
    },

    #[error("Audit {id} is {status}, not completed")]
    NotCompleted { id: i64, status: AuditStatus },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for audit record stores
///
/// Every lifecycle method performs one atomic write and refuses transitions
/// that [`AuditStatus::can_transition_to`] does not allow.
pub trait AuditStore {
    // ===== Record Lifecycle =====

    /// Creates a pending audit for `url` and returns its ID
    fn create_audit(&mut self, url: &str) -> StorageResult<i64>;

    /// Gets an audit by ID
    fn get_audit(&self, id: i64) -> StorageResult<AuditRecord>;

    /// Moves a pending audit to processing
    fn mark_processing(&mut self, id: i64) -> StorageResult<()>;

    /// Stores the result of a finished pipeline run and marks it completed
    fn complete_audit(&mut self, id: i64, result: &AuditResult) -> StorageResult<()>;

    /// Marks an in-flight audit failed, keeping the message in the results
    fn fail_audit(&mut self, id: i64, message: &str) -> StorageResult<()>;

    /// Attaches (or replaces) suggestions on a completed audit
    fn attach_suggestions(&mut self, id: i64, suggestions: &SuggestionSet) -> StorageResult<()>;

    // ===== Queries =====

    /// ID of the most recently created audit
    fn latest_audit_id(&self) -> StorageResult<Option<i64>>;

    /// Most recent audits first, at most `limit`
    fn list_audits(&self, limit: usize) -> StorageResult<Vec<AuditRecord>>;

    /// Number of audits in each status
    fn count_by_status(&self) -> StorageResult<HashMap<AuditStatus, u64>>;

    /// Mean SEO, performance and security scores over completed audits
    ///
    /// `None` when no audit has completed yet.
    fn average_scores(&self) -> StorageResult<Option<ScoreAverages>>;
}

/// Mean scores across completed audits
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreAverages {
    pub seo: f64,
    pub performance: f64,
    pub security: f64,
}
