//! Lifecycle status of a persisted audit
//!
//! An audit moves `Pending → Processing → Completed | Failed`. Readers may
//! observe `Processing` with no results at any time; that is the normal
//! view of an in-flight audit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current status of an audit record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    /// Record created, task not yet started
    Pending,

    /// Pipeline is running
    Processing,

    /// Pipeline finished and results are stored
    Completed,

    /// Pipeline failed; the error message is stored in the results blob
    Failed,
}

impl AuditStatus {
    /// Returns true if no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true while the audit has not finished
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true if moving to `next` is a legal lifecycle step
    ///
    /// A pending audit may fail directly: an error raised before the
    /// pipeline starts must not leave the record stuck.
    pub fn can_transition_to(&self, next: AuditStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all statuses in lifecycle order
    pub fn all_statuses() -> [Self; 4] {
        [
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
