//! LLM integration for Talent Archaeologist.
//!
//! Supports:
//! - **DeepSeek**: `deepseek-chat` over its OpenAI-compatible API, JSON-object mode
//! - **OpenAI**: chat completions with strict JSON-schema output
//!
//! Both go through `ChatCompletionsProvider`; callers only see `LlmProvider`.

pub mod chat_completions;
pub mod costs;
pub mod provider;

pub use chat_completions::{ChatCompletionsProvider, StructuredOutput};
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    DeepSeek,
    OpenAi,
}

impl LlmBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Backend-specific environment variable holding the API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn structured_output(&self) -> StructuredOutput {
        match self {
            Self::DeepSeek => StructuredOutput::JsonObject,
            Self::OpenAi => StructuredOutput::JsonSchema,
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::InvalidValue {
                key: "TALENT_LLM_BACKEND".to_string(),
                message: format!("unknown backend '{}', expected deepseek or openai", other),
            }),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    /// `None` when no key was supplied; analysis then fails with a missing credential.
    pub api_key: Option<secrecy::SecretString>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Defaults for a backend, without a key.
    pub fn for_backend(backend: LlmBackend) -> Self {
        Self {
            backend,
            api_key: None,
            model: backend.default_model().to_string(),
            base_url: backend.default_base_url().to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = ChatCompletionsProvider::new(
        config.backend.name(),
        &config.base_url,
        config.api_key.clone(),
        config.model.clone(),
        config.backend.structured_output(),
        config.timeout,
    )?;

    tracing::info!(
        backend = %config.backend,
        model = %config.model,
        credential = provider.has_credential(),
        "LLM provider configured"
    );
    Ok(Arc::new(provider))
}
