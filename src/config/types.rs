use serde::Deserialize;

/// Browser user agent sent with every request so that sites serve the same
/// markup they would serve to a visitor
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default chat-completions endpoint used for suggestion generation
pub const DEFAULT_SUGGESTIONS_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Main configuration structure for Site-Audit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User agent header for the page fetch and all probes
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for the primary page GET (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for each auxiliary HEAD probe (seconds)
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Maximum redirect hops followed by any request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 10,
            probe_timeout_secs: 5,
            max_redirects: 10,
        }
    }
}

/// Link liveness sampling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Number of leading anchors whose links are checked per audit
    #[serde(rename = "sample-size")]
    pub sample_size: usize,

    /// Number of link probes allowed in flight at once
    #[serde(rename = "max-concurrent-checks")]
    pub max_concurrent_checks: usize,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            sample_size: 40,
            max_concurrent_checks: 10,
        }
    }
}

/// External suggestion generation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Timeout for the suggestion request (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl SuggestionsConfig {
    /// Returns the API key if external suggestion generation is configured
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: DEFAULT_SUGGESTIONS_ENDPOINT.to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory where markdown reports are written
    #[serde(rename = "report-dir")]
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./siteaudit.db".to_string(),
            report_dir: "./reports".to_string(),
        }
    }
}
