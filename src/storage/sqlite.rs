//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the AuditStore trait.

use crate::audit::AuditResult;
use crate::state::AuditStatus;
use crate::storage::schema::apply_migrations;
use crate::storage::traits::{AuditStore, ScoreAverages, StorageError, StorageResult};
use crate::storage::{AuditRecord, ResultsData};
use crate::suggest::SuggestionSet;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::path::Path;

const RECORD_COLUMNS: &str = "id, url, timestamp, title, score_seo, score_performance, \
     score_security, broken_links, results_data, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// A row as read from the database, before the results blob is decoded
struct RawRecord {
    id: i64,
    url: String,
    timestamp: String,
    title: Option<String>,
    score_seo: u32,
    score_performance: u32,
    score_security: u32,
    broken_links: u32,
    results_data: Option<String>,
    status: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            timestamp: row.get(2)?,
            title: row.get(3)?,
            score_seo: row.get(4)?,
            score_performance: row.get(5)?,
            score_security: row.get(6)?,
            broken_links: row.get(7)?,
            results_data: row.get(8)?,
            status: row.get(9)?,
        })
    }

    fn into_record(self) -> StorageResult<AuditRecord> {
        let results = match self.results_data {
            Some(json) => Some(serde_json::from_str::<ResultsData>(&json)?),
            None => None,
        };

        Ok(AuditRecord {
            id: self.id,
            url: self.url,
            timestamp: self.timestamp,
            title: self.title,
            score_seo: self.score_seo,
            score_performance: self.score_performance,
            score_security: self.score_security,
            broken_links: self.broken_links,
            results,
            status: AuditStatus::from_db_string(&self.status).unwrap_or(AuditStatus::Failed),
        })
    }
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Opens or creates the database file (and its parent directory) and
    /// applies any pending migrations.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        let applied = apply_migrations(&mut conn)?;
        if applied > 0 {
            tracing::info!("Applied {} migration(s) to {}", applied, path.display());
        }

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    fn status_of(tx: &Transaction<'_>, id: i64) -> StorageResult<AuditStatus> {
        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM audits WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let status = status.ok_or(StorageError::AuditNotFound(id))?;
        Ok(AuditStatus::from_db_string(&status).unwrap_or(AuditStatus::Failed))
    }

    /// Checks the transition and runs `update` against the current status
    ///
    /// `update` receives the transaction and the status it must still match;
    /// it is expected to issue one guarded UPDATE.
    fn transition<F>(&mut self, id: i64, to: AuditStatus, update: F) -> StorageResult<()>
    where
        F: FnOnce(&Transaction<'_>, AuditStatus) -> StorageResult<usize>,
    {
        let tx = self.conn.transaction()?;
        let from = Self::status_of(&tx, id)?;

        if !from.can_transition_to(to) {
            return Err(StorageError::InvalidTransition { id, from, to });
        }

        if update(&tx, from)? != 1 {
            return Err(StorageError::Database(format!(
                "Audit {} changed status during update",
                id
            )));
        }

        tx.commit()?;
        tracing::debug!("Audit {}: {} -> {}", id, from, to);
        Ok(())
    }
}

impl AuditStore for SqliteStorage {
    // ===== Record Lifecycle =====

    fn create_audit(&mut self, url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO audits (url, timestamp, status) VALUES (?1, ?2, ?3)",
            params![url, now, AuditStatus::Pending.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_audit(&self, id: i64) -> StorageResult<AuditRecord> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM audits WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                RawRecord::from_row,
            )
            .optional()?
            .ok_or(StorageError::AuditNotFound(id))?;

        raw.into_record()
    }

    fn mark_processing(&mut self, id: i64) -> StorageResult<()> {
        self.transition(id, AuditStatus::Processing, |tx, from| {
            Ok(tx.execute(
                "UPDATE audits SET status = ?1 WHERE id = ?2 AND status = ?3",
                params![
                    AuditStatus::Processing.to_db_string(),
                    id,
                    from.to_db_string()
                ],
            )?)
        })
    }

    fn complete_audit(&mut self, id: i64, result: &AuditResult) -> StorageResult<()> {
        let blob = serde_json::to_string(&ResultsData::completed(result.clone()))?;
        let title = result.features.seo.title.clone();
        let broken_links = result.features.links.broken_links as u32;

        self.transition(id, AuditStatus::Completed, |tx, from| {
            Ok(tx.execute(
                "UPDATE audits SET status = ?1, title = ?2, score_seo = ?3,
                 score_performance = ?4, score_security = ?5, broken_links = ?6,
                 results_data = ?7
                 WHERE id = ?8 AND status = ?9",
                params![
                    AuditStatus::Completed.to_db_string(),
                    title,
                    result.scores.seo,
                    result.scores.performance,
                    result.scores.security,
                    broken_links,
                    blob,
                    id,
                    from.to_db_string()
                ],
            )?)
        })
    }

    fn fail_audit(&mut self, id: i64, message: &str) -> StorageResult<()> {
        self.transition(id, AuditStatus::Failed, |tx, from| {
            let url: String = tx.query_row(
                "SELECT url FROM audits WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            let blob = serde_json::to_string(&ResultsData::failed(&url, message))?;

            Ok(tx.execute(
                "UPDATE audits SET status = ?1, results_data = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    AuditStatus::Failed.to_db_string(),
                    blob,
                    id,
                    from.to_db_string()
                ],
            )?)
        })
    }

    fn attach_suggestions(&mut self, id: i64, suggestions: &SuggestionSet) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let row: Option<(String, Option<String>)> = tx
            .query_row(
                "SELECT status, results_data FROM audits WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (status, results_data) = row.ok_or(StorageError::AuditNotFound(id))?;

        let status = AuditStatus::from_db_string(&status).unwrap_or(AuditStatus::Failed);
        if status != AuditStatus::Completed {
            return Err(StorageError::NotCompleted { id, status });
        }

        let mut data: ResultsData = match results_data {
            Some(json) => serde_json::from_str(&json)?,
            None => ResultsData::default(),
        };
        data.suggestions = Some(suggestions.clone());

        tx.execute(
            "UPDATE audits SET results_data = ?1 WHERE id = ?2",
            params![serde_json::to_string(&data)?, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ===== Queries =====

    fn latest_audit_id(&self) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM audits ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_audits(&self, limit: usize) -> StorageResult<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM audits ORDER BY id DESC LIMIT ?1",
            RECORD_COLUMNS
        ))?;

        let raws = stmt
            .query_map(params![limit as i64], RawRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(RawRecord::into_record).collect()
    }

    fn count_by_status(&self) -> StorageResult<HashMap<AuditStatus, u64>> {
        let mut counts: HashMap<AuditStatus, u64> = AuditStatus::all_statuses()
            .into_iter()
            .map(|status| (status, 0))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM audits GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            if let Some(status) = AuditStatus::from_db_string(&status) {
                *counts.entry(status).or_insert(0) += count as u64;
            }
        }

        Ok(counts)
    }

    fn average_scores(&self) -> StorageResult<Option<ScoreAverages>> {
        let row = self.conn.query_row(
            "SELECT COUNT(*), AVG(score_seo), AVG(score_performance), AVG(score_security)
             FROM audits WHERE status = ?1",
            params![AuditStatus::Completed.to_db_string()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )?;

        Ok(match row {
            (count, Some(seo), Some(performance), Some(security)) if count > 0 => {
                Some(ScoreAverages {
                    seo,
                    performance,
                    security,
                })
            }
            _ => None,
        })
    }
}
