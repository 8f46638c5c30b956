//! Mock provider for development and tests.

use super::{extract_first_word, ProviderError, TextProvider};
use async_trait::async_trait;

/// Mock text provider.
///
/// Replies either with the question itself or with a fixed text, which then
/// goes through the same word extraction as a real provider reply.
pub struct MockTextProvider {
    reply: Option<String>,
    enabled: bool,
}

impl MockTextProvider {
    /// Answers with the first word of the question.
    pub fn echo() -> Self {
        Self {
            reply: None,
            enabled: true,
        }
    }

    /// Answers every question with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            enabled: true,
        }
    }

    /// Behaves like a provider with no credential configured.
    pub fn disabled() -> Self {
        Self {
            reply: None,
            enabled: false,
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn answer(&self, question: &str) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        let text = self.reply.as_deref().unwrap_or(question);
        extract_first_word(text).ok_or(ProviderError::EmptyAnswer)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
