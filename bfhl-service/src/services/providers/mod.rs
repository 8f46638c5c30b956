//! AI provider abstractions and implementations.
//!
//! The handler only ever sees [`TextProvider::answer`]; which backend sits
//! behind it (Gemini, an OpenAI-compatible API, or the mock) is decided by
//! configuration in [`build_provider`].

pub mod gemini;
pub mod mock;
pub mod openai;

use crate::config::{AiConfig, AiProvider};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Instruction sent ahead of every question.
pub const ONE_WORD_INSTRUCTION: &str = "You must answer in exactly ONE WORD only. No punctuation.";

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("AI provider request failed with HTTP {status}")]
    ApiError { status: u16 },

    #[error("AI provider request timed out")]
    Timeout,

    #[error("AI provider unreachable: {0}")]
    NetworkError(String),

    #[error("AI provider returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("AI returned empty answer.")]
    EmptyAnswer,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL can carry credentials; never let it into a message.
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = err.status() {
            ProviderError::ApiError {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::Misconfigured(msg),
            ProviderError::EmptyAnswer => {
                AppError::EmptyAnswer("AI returned empty answer.".to_string())
            }
            other => AppError::UpstreamError(other.to_string()),
        }
    }
}

/// Trait for one-word question answering backends.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Answer `question` (already trimmed and length-checked) with a single
    /// alphanumeric token.
    async fn answer(&self, question: &str) -> Result<String, ProviderError>;

    /// Short backend name for logs and metrics.
    fn name(&self) -> &'static str;
}

/// First maximal run of ASCII letters and digits in `text`.
pub fn extract_first_word(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_alphanumeric())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Shared HTTP client setup for the remote providers.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError(format!("failed to create HTTP client: {}", e)))
}

/// Pick the provider named by configuration.
pub fn build_provider(config: &AiConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    let provider: Arc<dyn TextProvider> = match config.provider {
        AiProvider::Gemini => Arc::new(gemini::GeminiTextProvider::new(
            gemini::GeminiConfig::from(config),
        )?),
        AiProvider::OpenAi => Arc::new(openai::OpenAiTextProvider::new(
            openai::OpenAiConfig::from(config),
        )?),
        AiProvider::Mock => Arc::new(mock::MockTextProvider::echo()),
    };
    Ok(provider)
}
