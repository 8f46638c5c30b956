//! Gemini AI provider implementation.
//!
//! Calls `models/{model}:generateContent` on Google's Generative Language API.
//! When no model is configured, the first model advertising
//! `generateContent` is discovered once and reused for the process lifetime.

use super::{extract_first_word, http_client, ProviderError, TextProvider, ONE_WORD_INSTRUCTION};
use crate::config::AiConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key, keeping it out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub model: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&AiConfig> for GeminiConfig {
    fn from(config: &AiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            timeout: config.timeout,
        }
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
    discovered_model: OnceCell<String>,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            discovered_model: OnceCell::new(),
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .ok_or_else(|| {
                ProviderError::NotConfigured("AI provider API key is not configured.".to_string())
            })
    }

    /// Model to call: the configured one, else the discovered one.
    ///
    /// Concurrent first callers wait on a single discovery request. A failed
    /// discovery is not cached, so the next request tries again.
    async fn model(&self, api_key: &str) -> Result<&str, ProviderError> {
        if let Some(model) = &self.config.model {
            return Ok(model);
        }
        let model = self
            .discovered_model
            .get_or_try_init(|| self.discover_model(api_key))
            .await?;
        Ok(model)
    }

    async fn discover_model(&self, api_key: &str) -> Result<String, ProviderError> {
        let url = format!("{}/models", self.base_url());

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Gemini model listing failed");
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
            });
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::InvalidResponse(format!("model listing: {}", e.without_url()))
            })?;

        let model = select_model(&listing.models).ok_or_else(|| {
            ProviderError::InvalidResponse("no model supports generateContent".to_string())
        })?;

        tracing::info!(model = %model, "Selected Gemini model");
        Ok(model)
    }
}

/// Prefer a `flash` model among those supporting `generateContent`.
fn select_model(models: &[ModelInfo]) -> Option<String> {
    let capable: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .collect();

    capable
        .iter()
        .find(|m| m.name.contains("flash"))
        .or_else(|| capable.first())
        .map(|m| m.name.trim_start_matches("models/").to_string())
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn answer(&self, question: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let model = self.model(api_key).await?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(format!("{}\nQuestion: {}", ONE_WORD_INSTRUCTION, question)),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url(), model);

        tracing::debug!(
            model = %model,
            prompt_len = question.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_text, "Gemini API error");
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing candidates[0].content.parts[0].text".into())
            })?;

        extract_first_word(text).ok_or(ProviderError::EmptyAnswer)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn selects_flash_model_supporting_generate_content() {
        let models = vec![
            model("models/embedding-001", &["embedContent"]),
            model("models/gemini-pro", &["generateContent"]),
            model("models/gemini-2.0-flash", &["generateContent", "countTokens"]),
        ];
        assert_eq!(select_model(&models), Some("gemini-2.0-flash".to_string()));
    }

    #[test]
    fn falls_back_to_first_capable_model() {
        let models = vec![
            model("models/embedding-001", &["embedContent"]),
            model("models/gemini-pro", &["generateContent"]),
        ];
        assert_eq!(select_model(&models), Some("gemini-pro".to_string()));
    }

    #[test]
    fn no_capable_model() {
        let models = vec![model("models/embedding-001", &["embedContent"])];
        assert_eq!(select_model(&models), None);
    }

    #[test]
    fn parses_nested_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Paris\n"}]},"finishReason":"STOP"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates[0].content.as_ref().unwrap().parts[0]
            .text
            .as_deref();
        assert_eq!(text, Some("Paris\n"));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: None,
            model: Some("gemini-2.0-flash".to_string()),
            base_url: GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert!(matches!(
            provider.answer("capital of France?").await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
