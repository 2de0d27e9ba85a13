//! Output module for audit reports and statistics
//!
//! This module handles:
//! - Rendering stored audits as markdown reports
//! - Rendering the audit history table
//! - Aggregating statistics across all audits

mod markdown;
pub mod stats;

pub use markdown::{format_audit_report, format_history, report_filename, write_report};
pub use stats::{load_statistics, print_statistics, AuditStatistics};
