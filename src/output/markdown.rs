//! Markdown report generation
//!
//! This module renders a stored audit as a human-readable markdown report:
//! scores, SEO signals, resource weight, security headers, link health and
//! any attached suggestions. Failed audits render as an error report.

use crate::audit::AuditResult;
use crate::state::AuditStatus;
use crate::storage::AuditRecord;
use crate::suggest::SuggestionSet;
use crate::{AuditError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest host fragment kept in a report filename
const FILENAME_HOST_LIMIT: usize = 50;

/// Builds the report filename for an audit of `url`
///
/// The host (with port, if any) loses every `www.`, dots and slashes become
/// underscores, and the result is cut to 50 characters. An unparseable or
/// hostless URL yields `website`.
pub fn report_filename(url: &str, audit_id: i64) -> String {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed.host_str().map(|host| match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .map(|host| host.replace("www.", ""))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "website".to_string());

    let cleaned: String = host
        .replace(['.', '/'], "_")
        .chars()
        .take(FILENAME_HOST_LIMIT)
        .collect();

    format!("audit_report_{}_{}.md", cleaned, audit_id)
}

/// Renders `record` and writes it under `dir`, returning the written path
///
/// # Errors
///
/// Fails with `NotReady` for pending or processing audits, or when the
/// directory or file cannot be written.
pub fn write_report(dir: &Path, record: &AuditRecord) -> Result<PathBuf> {
    let markdown = format_audit_report(record)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(&record.url, record.id));
    fs::write(&path, markdown)?;

    tracing::info!("Wrote report for audit {} to {}", record.id, path.display());
    Ok(path)
}

/// Formats a finished audit as markdown
pub fn format_audit_report(record: &AuditRecord) -> Result<String> {
    match (record.status, record.audit_result()) {
        (AuditStatus::Completed, Some(result)) => Ok(format_completed(record, result)),
        // Rows migrated from before the status column may hold no results blob
        (AuditStatus::Completed, None) => Ok(format_error_report(
            record,
            "No audit results were stored for this audit.",
        )),
        (AuditStatus::Failed, _) => Ok(format_error_report(
            record,
            record.error_message().unwrap_or("Unknown error"),
        )),
        (status, _) => Err(AuditError::NotReady {
            id: record.id,
            status,
        }),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn format_completed(record: &AuditRecord, result: &AuditResult) -> String {
    let features = &result.features;
    let seo = &features.seo;
    let perf = &features.performance;
    let mut md = String::new();

    md.push_str("# Site Audit Report\n\n");
    md.push_str(&format!("- **Audit ID**: {}\n", record.id));
    md.push_str(&format!("- **URL**: {}\n", features.url));
    if features.final_url != features.url {
        md.push_str(&format!("- **Final URL**: {}\n", features.final_url));
    }
    md.push_str(&format!("- **Audited**: {}\n\n", record.timestamp));

    md.push_str("## Scores\n\n");
    md.push_str("| Category | Score |\n");
    md.push_str("|----------|-------|\n");
    md.push_str(&format!("| SEO | {}/100 |\n", result.scores.seo));
    md.push_str(&format!("| Performance | {}/100 |\n", result.scores.performance));
    md.push_str(&format!("| Security | {}/100 |\n\n", result.scores.security));

    md.push_str("## SEO\n\n");
    md.push_str(&format!(
        "- **Title**: {} ({} characters, {})\n",
        seo.title.as_deref().unwrap_or("(missing)"),
        seo.title_length,
        seo.title_status.label()
    ));
    md.push_str(&format!(
        "- **Meta Description**: {} ({} characters, {})\n",
        seo.meta_description.as_deref().unwrap_or("(missing)"),
        seo.meta_length,
        seo.meta_status.label()
    ));
    md.push_str(&format!(
        "- **Headings**: {} H1, {} H2, {} H3\n",
        seo.h1_count, seo.h2_count, seo.h3_count
    ));
    md.push_str(&format!(
        "- **Images**: {} total, {} missing alt text\n",
        seo.img_count, seo.missing_alt
    ));
    md.push_str(&format!("- **Canonical Tag**: {}\n", yes_no(seo.canonical_present)));
    md.push_str(&format!("- **Robots Meta Tag**: {}\n", yes_no(seo.robots_meta)));
    md.push_str(&format!("- **sitemap.xml**: {}\n", yes_no(seo.sitemap_available)));
    md.push_str(&format!("- **robots.txt**: {}\n\n", yes_no(seo.robots_available)));

    md.push_str("## Performance\n\n");
    md.push_str(&format!("- **Page Size**: {:.2} KB\n", perf.page_size_kb));
    md.push_str(&format!(
        "- **JavaScript**: {} files, {:.2} KB ({} external)\n",
        perf.js_count, perf.js_size_kb, perf.external_scripts
    ));
    md.push_str(&format!(
        "- **CSS**: {} files, {:.2} KB\n",
        perf.css_count, perf.css_size_kb
    ));
    if let Some(image) = &perf.largest_image_url {
        md.push_str(&format!(
            "- **Largest Image**: {} ({:.2} KB)\n",
            image, perf.largest_image_kb
        ));
    }
    md.push_str(&format!("- **LCP Candidate**: {}\n\n", perf.lcp_candidate.label()));

    md.push_str("## Security Headers\n\n");
    md.push_str("| Header | Present |\n");
    md.push_str("|--------|---------|\n");
    for (name, present) in features.security_headers.entries() {
        md.push_str(&format!("| {} | {} |\n", name, yes_no(present)));
    }
    md.push('\n');

    let links = &features.links;
    md.push_str("## Links\n\n");
    md.push_str(&format!("- **Working (sampled)**: {}\n", links.working_links));
    md.push_str(&format!("- **Broken (sampled)**: {}\n", links.broken_links));
    md.push_str(&format!("- **Internal**: {}\n", links.internal_links));
    md.push_str(&format!("- **External**: {}\n\n", links.external_links));

    if let Some(set) = record.suggestions() {
        md.push_str(&format_suggestions(set));
    }

    md
}

fn format_suggestions(set: &SuggestionSet) -> String {
    let mut md = String::from("## Suggestions\n\n");

    for (category, entries) in set.iter() {
        if entries.is_empty() {
            continue;
        }
        md.push_str(&format!("### {}\n\n", category.title()));
        for entry in entries {
            md.push_str(&format!("- **{}**: {}\n", entry.issue, entry.suggestion));
        }
        md.push('\n');
    }

    md
}

fn format_error_report(record: &AuditRecord, message: &str) -> String {
    let mut md = String::new();

    md.push_str("# Site Audit Report\n\n");
    md.push_str(&format!("- **Audit ID**: {}\n", record.id));
    md.push_str(&format!("- **URL**: {}\n", record.url));
    md.push_str(&format!("- **Audited**: {}\n", record.timestamp));
    md.push_str(&format!("- **Status**: {}\n\n", record.status));

    md.push_str("## Error\n\n");
    md.push_str(message);
    md.push_str("\n\n");
    md.push_str("The page could not be audited. Check that the URL is reachable and try again.\n");

    md
}

/// Formats a list of audits as a markdown table, newest first as given
pub fn format_history(records: &[AuditRecord]) -> String {
    let mut md = String::from("# Audit History\n\n");

    if records.is_empty() {
        md.push_str("No audits recorded yet.\n");
        return md;
    }

    md.push_str("| ID | URL | Status | SEO | Performance | Security | Broken Links | Audited |\n");
    md.push_str("|----|-----|--------|-----|-------------|----------|--------------|---------|\n");

    for record in records {
        if record.status == AuditStatus::Completed {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                record.id,
                record.url,
                record.status,
                record.score_seo,
                record.score_performance,
                record.score_security,
                record.broken_links,
                record.timestamp
            ));
        } else {
            md.push_str(&format!(
                "| {} | {} | {} | - | - | - | - | {} |\n",
                record.id, record.url, record.status, record.timestamp
            ));
        }
    }

    md
}
