//! Configuration types, loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Knobs for the analysis request itself.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Sampling temperature for the analysis call.
    pub temperature: f32,
    /// Max tokens for the structured report.
    pub max_tokens: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 2048,
        }
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    /// Serve the REST surface on this port when set.
    pub http_port: Option<u16>,
    /// Write rolling log files here instead of stderr when set.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("TALENT_LLM_BACKEND") {
            Some(raw) => LlmBackend::from_str(&raw)?,
            None => LlmBackend::DeepSeek,
        };

        let api_key = get("TALENT_API_KEY")
            .or_else(|| get(backend.key_env_var()))
            .or_else(|| get("API_KEY"))
            .map(SecretString::from);

        let mut llm = LlmConfig::for_backend(backend);
        llm.api_key = api_key;
        if let Some(model) = get("TALENT_MODEL") {
            llm.model = model;
        }
        if let Some(base_url) = get("TALENT_BASE_URL") {
            llm.base_url = base_url;
        }
        if let Some(secs) = parse_var::<u64>(&get, "TALENT_REQUEST_TIMEOUT_SECS")? {
            require_nonzero("TALENT_REQUEST_TIMEOUT_SECS", secs)?;
            llm.timeout = Duration::from_secs(secs);
        }

        let mut analysis = AnalysisConfig::default();
        if let Some(temperature) = parse_var::<f32>(&get, "TALENT_TEMPERATURE")? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidValue {
                    key: "TALENT_TEMPERATURE".to_string(),
                    message: format!("{} is outside 0.0..=2.0", temperature),
                });
            }
            analysis.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var::<u32>(&get, "TALENT_MAX_TOKENS")? {
            require_nonzero("TALENT_MAX_TOKENS", u64::from(max_tokens))?;
            analysis.max_tokens = max_tokens;
        }

        Ok(Self {
            llm,
            analysis,
            http_port: parse_var::<u16>(&get, "TALENT_HTTP_PORT")?,
            log_dir: get("TALENT_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{}': {}", raw, e),
            }),
        None => Ok(None),
    }
}

/// A zero timeout or token cap would make every request fail.
fn require_nonzero(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
