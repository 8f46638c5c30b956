use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Substring every operator identity must contain (case-insensitive).
pub const REQUIRED_EMAIL_DOMAIN: &str = "@chitkara";

/// Default bound on a single outbound AI call.
const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct BfhlConfig {
    pub common: core_config::Config,
    pub identity: IdentityConfig,
    pub ai: AiConfig,
}

/// Operator identity echoed in every response envelope.
#[derive(Debug, Clone, Default)]
pub struct IdentityConfig {
    official_email: String,
}

impl IdentityConfig {
    pub fn new(official_email: impl Into<String>) -> Self {
        Self {
            official_email: official_email.into().trim().to_string(),
        }
    }

    /// The configured value as-is, for error envelopes. Never fails.
    pub fn official_email(&self) -> &str {
        &self.official_email
    }

    /// The configured value, provided it is present and carries the required domain.
    pub fn verified(&self) -> Result<&str, AppError> {
        let email = self.official_email.as_str();
        if email.is_empty() || !email.to_lowercase().contains(REQUIRED_EMAIL_DOMAIN) {
            return Err(AppError::Misconfigured(
                "Server misconfigured: OFFICIAL_EMAIL missing/invalid.".to_string(),
            ));
        }
        Ok(email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Google Generative Language API (`generateContent`).
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint, e.g. Groq.
    OpenAi,
    /// Local deterministic provider for development.
    Mock,
}

impl FromStr for AiProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(AiProvider::Gemini),
            "openai" | "groq" => Ok(AiProvider::OpenAi),
            "mock" => Ok(AiProvider::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "AI_PROVIDER must be one of gemini, openai, mock (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub api_key: Option<Secret<String>>,
    /// Explicit model id. When absent the provider default (or discovery) applies.
    pub model: Option<String>,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            api_key: None,
            model: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
        }
    }
}

impl BfhlConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let provider: AiProvider = get_env("AI_PROVIDER")
            .as_deref()
            .unwrap_or("gemini")
            .parse()?;

        let api_key = get_env("AI_API_KEY")
            .or_else(|| match provider {
                AiProvider::Gemini => get_env("GEMINI_API_KEY"),
                AiProvider::OpenAi => get_env("GROQ_API_KEY"),
                AiProvider::Mock => None,
            })
            .map(Secret::new);

        let timeout_secs = match get_env("AI_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("AI_TIMEOUT_SECS is invalid: {}", e))
            })?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(BfhlConfig {
            common: common_config,
            identity: IdentityConfig::new(get_env("OFFICIAL_EMAIL").unwrap_or_default()),
            ai: AiConfig {
                provider,
                api_key,
                model: get_env("AI_MODEL"),
                base_url: get_env("AI_BASE_URL"),
                timeout: Duration::from_secs(timeout_secs.max(1)),
            },
        })
    }
}

/// Read a variable, treating blank values as unset.
fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
