//! Condensed audit payload and prompts sent to the language model

use crate::audit::{score, FeatureSet};
use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = "You are a professional website auditor. Always return valid JSON \
with all 7 categories, each with 2-3 suggestions minimum.";

pub const LEGACY_SYSTEM_PROMPT: &str =
    "You are a professional website auditor. Always respond with valid JSON only.";

/// Groups the feature set into overview, seo, performance, security and
/// images sections
pub fn build_payload(features: &FeatureSet) -> Value {
    let scores = score(features);
    let seo = &features.seo;
    let perf = &features.performance;

    json!({
        "overview": {
            "url": features.url,
            "title": seo.title.as_deref().unwrap_or("Not found"),
            "score_seo": scores.seo,
            "score_performance": scores.performance,
            "score_security": scores.security,
            "broken_links": features.links.broken_links,
            "working_links": features.links.working_links,
        },
        "seo": {
            "has_title": seo.has_title,
            "title_length": seo.title_length,
            "title_status": seo.title_status.label(),
            "has_meta_description": seo.has_meta_description,
            "meta_length": seo.meta_length,
            "meta_status": seo.meta_status.label(),
            "meta_description": seo.meta_description.as_deref().unwrap_or("Not found"),
            "h1_count": seo.h1_count,
            "h2_count": seo.h2_count,
            "h3_count": seo.h3_count,
            "canonical_present": seo.canonical_present,
            "robots_meta": seo.robots_meta,
            "sitemap_available": seo.sitemap_available,
            "robots_available": seo.robots_available,
            "img_count": seo.img_count,
            "missing_alt": seo.missing_alt,
        },
        "performance": {
            "page_size_kb": perf.page_size_kb,
            "js_count": perf.js_count,
            "js_size_kb": perf.js_size_kb,
            "css_count": perf.css_count,
            "css_size_kb": perf.css_size_kb,
            "largest_image_kb": perf.largest_image_kb,
            "largest_image_url": perf.largest_image_url.as_deref().unwrap_or(""),
            "external_scripts": perf.external_scripts,
            "basic_lcp_element": perf.lcp_candidate.label(),
        },
        "security": {
            "security_headers": features.security_headers,
            "score_security": scores.security,
        },
        "images": {
            "img_count": seo.img_count,
            "missing_alt": seo.missing_alt,
            "largest_image_kb": perf.largest_image_kb,
        },
    })
}

fn pretty(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

/// Prompt for the seven-category `{issue, suggestion}` response
pub fn build_prompt(payload: &Value) -> String {
    format!(
        r#"You are an expert website auditor. Analyze this audit data and provide 10+ specific, actionable fix suggestions.

Audit Data:
{}

Return JSON with this EXACT structure (each category must have 2-3 suggestions minimum):
{{
  "seo": [{{"issue": "...", "suggestion": "..."}}, ...],
  "performance": [{{"issue": "...", "suggestion": "..."}}, ...],
  "security": [{{"issue": "...", "suggestion": "..."}}, ...],
  "metadata": [{{"issue": "...", "suggestion": "..."}}, ...],
  "content": [{{"issue": "...", "suggestion": "..."}}, ...],
  "schema": [{{"issue": "...", "suggestion": "..."}}, ...],
  "general": [{{"issue": "...", "suggestion": "..."}}, ...]
}}

Requirements:
- Provide 2-3 suggestions per category (minimum)
- Even for well-optimized sites, suggest refinements such as rich snippets, advanced caching or accessibility
- Be specific and actionable
- Return ONLY valid JSON"#,
        pretty(payload)
    )
}

/// Prompt for the five flat string lists of the simple contract
pub fn build_legacy_prompt(payload: &Value) -> String {
    format!(
        r#"You are an expert website auditor and SEO consultant. Analyze the following website audit data and provide structured fix suggestions.

Audit Data:
{}

Provide fix suggestions in the following JSON format:
{{
  "seo_fixes": ["list of SEO improvement suggestions"],
  "performance_fixes": ["list of performance optimization suggestions"],
  "security_fixes": ["list of security improvement suggestions"],
  "metadata_fixes": ["list of metadata and meta tag suggestions"],
  "general_recommendations": ["list of general website improvement recommendations"]
}}

Requirements:
- Each array should contain 3-7 specific, actionable suggestions
- Focus on the most critical issues first
- Prioritize fixes that will have the biggest impact
- Return ONLY valid JSON, no additional text or markdown"#,
        pretty(payload)
    )
}
