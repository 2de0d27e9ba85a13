//! Suggestion engine
//!
//! Produces categorized remediation suggestions for an audited page. When a
//! language-model client is configured the engine makes one call and
//! normalizes the reply; on any failure, or without a client, it falls back
//! to deterministic rules. Either way every one of the seven categories
//! ends up with at least two entries.
//!
//! # Example
//!
//! ```
//! use site_audit::audit::FeatureSet;
//! use site_audit::suggest::{Category, SuggestionEngine};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let set = rt.block_on(SuggestionEngine::fallback_only().suggest(&FeatureSet::default()));
//! assert!(set.get(Category::Schema).len() >= 2);
//! ```

mod client;
mod fallback;
mod payload;

pub use client::{OpenAiClient, SuggestionClient};
pub use fallback::{fallback_for, fallback_suggestions};
pub use payload::{build_legacy_prompt, build_payload, build_prompt};

use crate::audit::FeatureSet;
use crate::config::SuggestionsConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Minimum number of entries every category must hold
pub const MIN_PER_CATEGORY: usize = 2;

/// The seven fixed suggestion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Seo,
    Performance,
    Security,
    Metadata,
    Content,
    Schema,
    General,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Seo,
        Category::Performance,
        Category::Security,
        Category::Metadata,
        Category::Content,
        Category::Schema,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seo => "seo",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Metadata => "metadata",
            Self::Content => "content",
            Self::Schema => "schema",
            Self::General => "general",
        }
    }

    /// Heading used in reports
    pub fn title(&self) -> &'static str {
        match self {
            Self::Seo => "SEO",
            Self::Performance => "Performance",
            Self::Security => "Security",
            Self::Metadata => "Metadata",
            Self::Content => "Content",
            Self::Schema => "Structured Data",
            Self::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `{issue, suggestion}` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub issue: String,
    pub suggestion: String,
}

impl Suggestion {
    pub fn new(issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Suggestions keyed by category
///
/// Serializes as a JSON object with the lowercase category names as keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionSet(BTreeMap<Category, Vec<Suggestion>>);

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, entries: Vec<Suggestion>) {
        self.0.insert(category, entries);
    }

    /// Entries of one category, empty when the category is absent
    pub fn get(&self, category: Category) -> &[Suggestion] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Suggestion])> {
        self.0.iter().map(|(category, entries)| (*category, entries.as_slice()))
    }

    /// Number of categories present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total entries across all categories
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// True when all seven categories hold at least the minimum entries
    pub fn is_complete(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.get(*category).len() >= MIN_PER_CATEGORY)
    }
}

/// Flat string lists returned by the simple suggestion contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySuggestions {
    #[serde(default)]
    pub seo_fixes: Vec<String>,
    #[serde(default)]
    pub performance_fixes: Vec<String>,
    #[serde(default)]
    pub security_fixes: Vec<String>,
    #[serde(default)]
    pub metadata_fixes: Vec<String>,
    #[serde(default)]
    pub general_recommendations: Vec<String>,
}

impl LegacySuggestions {
    /// Derives the flat lists from a categorized set
    ///
    /// Schema entries join the metadata list and content entries join the
    /// general list.
    pub fn from_set(set: &SuggestionSet) -> Self {
        let texts = |categories: &[Category]| -> Vec<String> {
            categories
                .iter()
                .flat_map(|category| set.get(*category))
                .map(|s| format!("{}: {}", s.issue, s.suggestion))
                .collect()
        };

        Self {
            seo_fixes: texts(&[Category::Seo]),
            performance_fixes: texts(&[Category::Performance]),
            security_fixes: texts(&[Category::Security]),
            metadata_fixes: texts(&[Category::Metadata, Category::Schema]),
            general_recommendations: texts(&[Category::Content, Category::General]),
        }
    }

    /// Fills every empty list from `other`
    fn backfill_from(&mut self, other: LegacySuggestions) {
        let pairs = [
            (&mut self.seo_fixes, other.seo_fixes),
            (&mut self.performance_fixes, other.performance_fixes),
            (&mut self.security_fixes, other.security_fixes),
            (&mut self.metadata_fixes, other.metadata_fixes),
            (&mut self.general_recommendations, other.general_recommendations),
        ];
        for (target, source) in pairs {
            if target.is_empty() {
                *target = source;
            }
        }
    }
}

/// Generates suggestion sets, with or without a language model
#[derive(Clone, Default)]
pub struct SuggestionEngine {
    client: Option<Arc<dyn SuggestionClient>>,
}

impl fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field(
                "client",
                &self.client.as_ref().map(|client| client.provider_name()),
            )
            .finish()
    }
}

impl SuggestionEngine {
    pub fn new(client: Option<Arc<dyn SuggestionClient>>) -> Self {
        Self { client }
    }

    /// An engine that always uses the deterministic rules
    pub fn fallback_only() -> Self {
        Self { client: None }
    }

    /// Builds the engine from configuration; without an API key in the
    /// environment the engine runs in fallback-only mode
    pub fn from_config(config: &SuggestionsConfig) -> crate::Result<Self> {
        match OpenAiClient::from_config(config)? {
            Some(client) => {
                tracing::info!("Suggestion model configured: {}", config.model);
                Ok(Self::new(Some(Arc::new(client))))
            }
            None => {
                tracing::info!(
                    "{} not set, suggestions will use built-in rules",
                    config.api_key_env
                );
                Ok(Self::fallback_only())
            }
        }
    }

    /// Returns true when a language-model client is configured
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Produces a complete suggestion set
    ///
    /// Never fails: external errors and malformed replies fall back to the
    /// deterministic rules.
    pub async fn suggest(&self, features: &FeatureSet) -> SuggestionSet {
        let fallback = fallback_suggestions(features);

        let Some(client) = &self.client else {
            return fallback;
        };

        let payload = build_payload(features);
        let reply = match client.complete(payload::SYSTEM_PROMPT, &build_prompt(&payload)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    "Suggestion request to {} failed, using built-in rules: {}",
                    client.provider_name(),
                    e
                );
                return fallback;
            }
        };

        match parse_model_response(&reply) {
            Some(parsed) => ensure_minimum(parsed, &fallback),
            None => {
                tracing::warn!("Malformed suggestion response, using built-in rules");
                fallback
            }
        }
    }

    /// Produces the five flat string lists of the simple contract
    ///
    /// Lists the model leaves empty are filled from the deterministic rules.
    pub async fn suggest_simple(&self, features: &FeatureSet) -> LegacySuggestions {
        let derived = LegacySuggestions::from_set(&fallback_suggestions(features));

        let Some(client) = &self.client else {
            return derived;
        };

        let payload = build_payload(features);
        let reply = client
            .complete(payload::LEGACY_SYSTEM_PROMPT, &build_legacy_prompt(&payload))
            .await;

        match reply.map(|text| parse_legacy_response(&text)) {
            Ok(Some(mut parsed)) => {
                parsed.backfill_from(derived);
                parsed
            }
            Ok(None) => {
                tracing::warn!("Malformed simple suggestion response, using built-in rules");
                derived
            }
            Err(e) => {
                tracing::warn!("Simple suggestion request failed, using built-in rules: {}", e);
                derived
            }
        }
    }
}

/// Parses a model reply into a suggestion set
///
/// Returns `None` when the reply is not a JSON object or a category key
/// holds something other than a list. Absent categories come back empty.
pub fn parse_model_response(text: &str) -> Option<SuggestionSet> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;

    let mut set = SuggestionSet::new();
    for category in Category::ALL {
        let entries = match object.get(category.as_str()) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => normalize(items),
            Some(_) => return None,
        };
        set.insert(category, entries);
    }
    Some(set)
}

/// Coerces raw reply items into `{issue, suggestion}` pairs
///
/// Objects keep their `issue`/`suggestion` strings (empty when missing);
/// bare strings become both issue and suggestion. Other items are dropped.
pub fn normalize(items: &[Value]) -> Vec<Suggestion> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(fields) => {
                let field = |name: &str| {
                    fields
                        .get(name)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(Suggestion::new(field("issue"), field("suggestion")))
            }
            Value::String(text) => Some(Suggestion::new(text.clone(), text.clone())),
            _ => None,
        })
        .collect()
}

/// Tops up under-populated categories from the fallback set
///
/// Entries already present are not added twice. A category stops growing
/// at the minimum, or earlier if the fallback supply runs out.
pub fn ensure_minimum(mut set: SuggestionSet, fallback: &SuggestionSet) -> SuggestionSet {
    for category in Category::ALL {
        let entries = set.0.entry(category).or_default();
        if entries.len() >= MIN_PER_CATEGORY {
            continue;
        }
        for item in fallback.get(category) {
            if entries.len() >= MIN_PER_CATEGORY {
                break;
            }
            if !entries.contains(item) {
                entries.push(item.clone());
            }
        }
    }
    set
}

fn parse_legacy_response(text: &str) -> Option<LegacySuggestions> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;

    let list = |key: &str| -> Vec<String> {
        match object.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(fields) => fields
                        .get("suggestion")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    };

    Some(LegacySuggestions {
        seo_fixes: list("seo_fixes"),
        performance_fixes: list("performance_fixes"),
        security_fixes: list("security_fixes"),
        metadata_fixes: list("metadata_fixes"),
        general_recommendations: list("general_recommendations"),
    })
}
