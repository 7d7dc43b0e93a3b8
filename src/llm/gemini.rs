//! Google Gemini text-completion provider.
//!
//! Talks to the Generative Language REST API (gemini-2.5-pro and friends)
//! using API key authentication. Only the text-in/text-out subset the
//! pipelines need is implemented.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::TextCompletion;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Create a new Gemini config with the default base URL.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// Load config from `GEMINI_API_KEY` and optional `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, crate::error::ConfigError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| crate::error::ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".to_string());
        Ok(Self::new(api_key, model))
    }
}

/// Google Gemini text-completion provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Build the URL for the generateContent endpoint.
    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }
}

#[async_trait]
impl TextCompletion for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.build_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed {
                provider: "gemini".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: "gemini".to_string(),
                reason: format!("HTTP {}: {}", status, body),
            });
        }

        let body: GeminiResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "gemini".to_string(),
                reason: "response contained no candidates".to_string(),
            })?;

        tracing::debug!(response_chars = text.len(), "completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
