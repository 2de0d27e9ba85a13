//! Statistics generation from the audit database
//!
//! This module provides functionality for extracting and displaying
//! aggregate audit statistics from the storage layer.

use crate::state::AuditStatus;
use crate::storage::{AuditStore, ScoreAverages};
use crate::Result;
use std::collections::HashMap;

/// Audit statistics summary
#[derive(Debug, Clone)]
pub struct AuditStatistics {
    /// Total number of audits recorded
    pub total_audits: u64,

    /// Count of audits by status
    pub audits_by_status: HashMap<AuditStatus, u64>,

    /// Mean scores of completed audits, if any completed
    pub average_scores: Option<ScoreAverages>,
}

impl AuditStatistics {
    pub fn count(&self, status: AuditStatus) -> u64 {
        self.audits_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Share of finished audits that completed, as a percentage
    pub fn success_rate(&self) -> f64 {
        let completed = self.count(AuditStatus::Completed);
        let finished = completed + self.count(AuditStatus::Failed);
        if finished == 0 {
            0.0
        } else {
            completed as f64 / finished as f64 * 100.0
        }
    }
}

/// Loads statistics from storage
pub fn load_statistics<S: AuditStore + ?Sized>(store: &S) -> Result<AuditStatistics> {
    let audits_by_status = store.count_by_status()?;
    let total_audits = audits_by_status.values().sum();
    let average_scores = store.average_scores()?;

    Ok(AuditStatistics {
        total_audits,
        audits_by_status,
        average_scores,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &AuditStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Overview:");
    println!("  Total audits: {}", stats.total_audits);
    println!();

    println!("Audits by Status:");
    for status in AuditStatus::all_statuses() {
        let count = stats.count(status);
        let percentage = if stats.total_audits > 0 {
            (count as f64 / stats.total_audits as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    match &stats.average_scores {
        Some(averages) => {
            println!("Average Scores (completed audits):");
            println!("  SEO: {:.1}", averages.seo);
            println!("  Performance: {:.1}", averages.performance);
            println!("  Security: {:.1}", averages.security);
        }
        None => println!("No completed audits yet."),
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} completed / {} failed)",
        stats.success_rate(),
        stats.count(AuditStatus::Completed),
        stats.count(AuditStatus::Failed)
    );
}
