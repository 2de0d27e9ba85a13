//! Audit service - dispatching and observing audit jobs
//!
//! The service is built once from its collaborators (a store, an auditor and
//! a suggestion engine) and handed to whatever drives it. Submitting an
//! audit creates a pending record and dispatches one `tokio` task; the
//! task's only observable effect is the status and results written back to
//! the store, which callers poll.

use crate::audit::{AuditResult, Auditor};
use crate::config::Config;
use crate::state::AuditStatus;
use crate::storage::{AuditRecord, AuditStore, SqliteStorage, StorageError};
use crate::suggest::{LegacySuggestions, SuggestionEngine, SuggestionSet};
use crate::url::normalize_input;
use crate::{AuditError, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// A submitted audit
#[derive(Debug)]
pub struct Dispatched {
    pub audit_id: i64,
    /// Handle of the background job; dropping it leaves the job running
    pub task: JoinHandle<()>,
}

/// Polling view of one audit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub id: i64,
    pub status: AuditStatus,
    pub has_results: bool,
}

/// Coordinates the store, the pipeline and the suggestion engine
pub struct AuditService<S> {
    store: Arc<Mutex<S>>,
    auditor: Arc<Auditor>,
    engine: SuggestionEngine,
    // Serializes suggestion generation so a set is generated at most once
    suggestion_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<S> Clone for AuditService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            auditor: Arc::clone(&self.auditor),
            engine: self.engine.clone(),
            suggestion_lock: Arc::clone(&self.suggestion_lock),
        }
    }
}

impl AuditService<SqliteStorage> {
    /// Builds the service from configuration: opens the database, the HTTP
    /// clients and the suggestion engine
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let auditor = Auditor::new(config)?;
        let engine = SuggestionEngine::from_config(&config.suggestions)?;
        Ok(Self::new(store, auditor, engine))
    }
}

impl<S> AuditService<S>
where
    S: AuditStore + Send + 'static,
{
    pub fn new(store: S, auditor: Auditor, engine: SuggestionEngine) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            auditor: Arc::new(auditor),
            engine,
            suggestion_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        lock(&self.store)
    }

    /// Creates a pending audit for `input` and dispatches its pipeline
    ///
    /// Returns as soon as the record exists. Fails only when the input is
    /// not a usable URL or the record cannot be created.
    pub async fn submit(&self, input: &str) -> Result<Dispatched> {
        let url = normalize_input(input)?;
        let audit_id = self
            .lock_store()
            .create_audit(url.as_str())
            .map_err(storage_error)?;

        tracing::info!("Audit {} queued for {}", audit_id, url);

        let task = tokio::spawn(run_job(
            Arc::clone(&self.store),
            Arc::clone(&self.auditor),
            audit_id,
            url.to_string(),
        ));

        Ok(Dispatched { audit_id, task })
    }

    /// Gets the full record of an audit
    pub fn get(&self, id: i64) -> Result<AuditRecord> {
        self.lock_store().get_audit(id).map_err(storage_error)
    }

    /// Current status of an audit, for polling
    pub fn status(&self, id: i64) -> Result<StatusView> {
        let record = self.get(id)?;
        Ok(StatusView {
            id,
            status: record.status,
            has_results: record.has_results(),
        })
    }

    /// Suggestions for a completed audit
    ///
    /// Returns the attached set when one exists. Otherwise generates one,
    /// attaches it, and returns it; later calls return the same set.
    pub async fn suggestions(&self, id: i64) -> Result<SuggestionSet> {
        if let Some(cached) = self.get(id)?.suggestions() {
            return Ok(cached.clone());
        }

        let _guard = self.suggestion_lock.lock().await;

        // Another caller may have attached a set while we waited
        let record = self.get(id)?;
        if let Some(cached) = record.suggestions() {
            return Ok(cached.clone());
        }

        let result = completed_result(&record)?;
        self.generate_and_attach(id, &result).await
    }

    /// Generates a fresh suggestion set, replacing any attached one
    pub async fn regenerate_suggestions(&self, id: i64) -> Result<SuggestionSet> {
        let _guard = self.suggestion_lock.lock().await;
        let result = completed_result(&self.get(id)?)?;
        self.generate_and_attach(id, &result).await
    }

    /// The five flat suggestion lists of the simple contract; not cached
    pub async fn simple_suggestions(&self, id: i64) -> Result<LegacySuggestions> {
        let result = completed_result(&self.get(id)?)?;
        Ok(self.engine.suggest_simple(&result.features).await)
    }

    async fn generate_and_attach(&self, id: i64, result: &AuditResult) -> Result<SuggestionSet> {
        let set = self.engine.suggest(&result.features).await;
        self.lock_store()
            .attach_suggestions(id, &set)
            .map_err(storage_error)?;

        tracing::info!(
            "Attached {} suggestions to audit {}",
            set.total(),
            id
        );
        Ok(set)
    }

    /// ID of the most recently created audit
    pub fn latest_audit_id(&self) -> Result<Option<i64>> {
        self.lock_store().latest_audit_id().map_err(storage_error)
    }

    /// Most recent audits first
    pub fn history(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        self.lock_store().list_audits(limit).map_err(storage_error)
    }

    /// Runs `f` with the store locked
    pub fn with_store<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        let store = self.lock_store();
        f(&*store)
    }
}

fn lock<S>(store: &Mutex<S>) -> MutexGuard<'_, S> {
    // Store writes are transactional, so a poisoned guard still holds consistent data
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn storage_error(error: StorageError) -> AuditError {
    match error {
        StorageError::AuditNotFound(id) => AuditError::AuditNotFound(id),
        StorageError::NotCompleted { id, status } => AuditError::NotReady { id, status },
        StorageError::InvalidTransition { from, to, .. } => {
            AuditError::InvalidTransition { from, to }
        }
        other => AuditError::Storage(other),
    }
}

fn completed_result(record: &AuditRecord) -> Result<AuditResult> {
    match (record.status, record.audit_result()) {
        (AuditStatus::Completed, Some(result)) => Ok(result.clone()),
        (status, _) => Err(AuditError::NotReady {
            id: record.id,
            status,
        }),
    }
}

/// One audit job: processing, pipeline, then completed or failed
async fn run_job<S>(store: Arc<Mutex<S>>, auditor: Arc<Auditor>, id: i64, url: String)
where
    S: AuditStore + Send + 'static,
{
    let started = lock(&store).mark_processing(id);
    if let Err(e) = started {
        tracing::error!("Audit {} could not start: {}", id, e);
        let failed = lock(&store).fail_audit(id, &format!("Could not start: {}", e));
        if let Err(e) = failed {
            tracing::error!("Failed to record start failure of audit {}: {}", id, e);
        }
        return;
    }

    // The pipeline runs in its own task so a panic surfaces as a JoinError
    // instead of leaving the record in processing
    let pipeline = tokio::spawn({
        let auditor = Arc::clone(&auditor);
        let url = url.clone();
        async move { auditor.audit(&url).await }
    });

    let joined = pipeline.await;
    let outcome = match joined {
        Ok(Ok(result)) => {
            tracing::info!(
                "Audit {} completed: seo {}, performance {}, security {}",
                id,
                result.scores.seo,
                result.scores.performance,
                result.scores.security
            );
            let mut store = lock(&store);
            store.complete_audit(id, &result)
        }
        Ok(Err(e)) => {
            tracing::warn!("Audit {} of {} failed: {}", id, url, e);
            let mut store = lock(&store);
            store.fail_audit(id, &e.to_string())
        }
        Err(e) => {
            tracing::error!("Audit {} of {} aborted: {}", id, url, e);
            let mut store = lock(&store);
            store.fail_audit(id, &format!("Unexpected error: {}", e))
        }
    };

    if let Err(e) = outcome {
        tracing::error!("Failed to record outcome of audit {}: {}", id, e);
    }
}
