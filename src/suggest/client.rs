//! Language-model client used by the suggestion engine

use crate::config::SuggestionsConfig;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// A single-shot chat completion capability
///
/// Implementations return the raw text of the model's reply. Any failure is
/// reported as an error; the engine decides what to do with it.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}

/// Client for OpenAI-compatible chat completion endpoints
pub struct OpenAiClient {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            model,
            api_key,
            temperature,
            client,
        })
    }

    /// Builds a client from configuration
    ///
    /// Returns `Ok(None)` when no API key is present in the environment.
    pub fn from_config(config: &SuggestionsConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            config.temperature,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }
}

#[async_trait]
impl SuggestionClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chat API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;

        // choices[0].message.content
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Chat API response missing content"))?
            .to_string();

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
