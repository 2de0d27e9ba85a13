//! Integration tests for Site-Audit
//!
//! These tests use wiremock to stand in for audited sites and for the
//! chat-completions endpoint, and drive the pipeline end-to-end.

mod audit_pipeline;
mod common;
mod service;
mod suggestions;
