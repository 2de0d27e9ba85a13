//! State module for tracking audit lifecycle
//!
//! `AuditStatus` is the only mutable state shared between the dispatching
//! caller and the background pipeline task; it lives on the persisted record.

mod audit_status;

pub use audit_status::AuditStatus;
