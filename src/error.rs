//! Error types for Talent Archaeologist.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM transport errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No API key configured for provider {provider}")]
    MissingCredential { provider: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Failures of the talent analysis call.
///
/// The wizard collapses every variant into the same "abort to welcome"
/// transition; only the message differs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("missing credential")]
    MissingCredential,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid answers: expected {expected} non-empty answers, got {actual}")]
    InvalidAnswers { expected: usize, actual: usize },
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingCredential { .. } => Self::MissingCredential,
            LlmError::RequestFailed { reason, .. } => Self::RequestFailed(reason),
            LlmError::InvalidResponse { reason, .. } => Self::MalformedResponse(reason),
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

/// An answer rejected by the minimum-length rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Answer too short: {actual} characters, at least {min} required")]
    AnswerTooShort { min: usize, actual: usize },
}

/// Wizard state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} while in phase {phase}")]
    InvalidTransition { phase: String, action: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
