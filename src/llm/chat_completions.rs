//! OpenAI-compatible `/chat/completions` transport over reqwest.
//!
//! DeepSeek and OpenAI both speak this wire format; they differ only in base
//! URL, model names, and how strictly they honour a JSON schema.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::LlmError;

use super::costs::model_cost;
use super::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

/// How the provider is asked for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredOutput {
    /// `{"type": "json_object"}`; the shape lives in the system prompt.
    JsonObject,
    /// `{"type": "json_schema", ...}` with `strict: true`.
    JsonSchema,
}

/// Chat-completions client for one provider and model.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    provider: String,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    output_mode: StructuredOutput,
    timeout: Duration,
}

impl ChatCompletionsProvider {
    pub fn new(
        provider: impl Into<String>,
        base_url: &str,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        output_mode: StructuredOutput,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let provider = provider.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: provider.clone(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            provider,
            api_key: api_key.filter(|k| !k.expose_secret().trim().is_empty()),
            model: model.into(),
            output_mode,
            timeout,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(ref schema) = request.response_schema {
            body["response_format"] = match self.output_mode {
                StructuredOutput::JsonObject => json!({ "type": "json_object" }),
                StructuredOutput::JsonSchema => json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema.name,
                        "strict": true,
                        "schema": schema.schema,
                    }
                }),
            };
        }

        body
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                provider: self.provider.clone(),
                timeout: self.timeout,
            }
        } else {
            LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: err.to_string(),
            }
        }
    }

    fn status_error(&self, status: StatusCode, retry_after: Option<Duration>, body: &str) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
                provider: self.provider.clone(),
            },
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                provider: self.provider.clone(),
                retry_after,
            },
            _ => LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: provider_error_message(body)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            },
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        model_cost(&self.model)
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| LlmError::MissingCredential {
            provider: self.provider.clone(),
        })?;

        let body = self.request_body(&request);
        debug!(provider = %self.provider, model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(provider = %self.provider, status = status.as_u16(), "Provider returned error status");
            return Err(self.status_error(status, retry_after, &text));
        }

        let parsed: ChatCompletionBody =
            serde_json::from_str(&text).map_err(|e| LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: format!("unreadable completion body: {}", e),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: "response contained no choices".to_string(),
            })?;

        let content = choice
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: "response contained no message content".to_string(),
            })?;

        let usage = parsed.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
            response_id: parsed.id,
        })
    }
}

/// Pull `error.message` out of a provider error body, if there is one.
fn provider_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .and_then(|e| e.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    id: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
