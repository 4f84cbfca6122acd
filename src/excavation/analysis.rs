//! Analysis client: turns seven answers into a `TalentResult`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::llm::costs;
use crate::llm::provider::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};

use super::model::TalentResult;
use super::prompts::{
    SCHEMA_NAME, SYSTEM_INSTRUCTION, build_excavation_prompt, parse_talent_response,
    talent_result_schema,
};
use super::questions::QUESTION_COUNT;

/// Sends one analysis request per call. No caching, no retries.
pub struct AnalysisClient {
    llm: Arc<dyn LlmProvider>,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(llm: Arc<dyn LlmProvider>, config: AnalysisConfig) -> Self {
        Self { llm, config }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Analyze exactly `QUESTION_COUNT` non-empty answers.
    pub async fn analyze(&self, answers: &[String]) -> Result<TalentResult, AnalysisError> {
        let actual = answers.iter().filter(|a| !a.trim().is_empty()).count();
        if answers.len() != QUESTION_COUNT || actual != QUESTION_COUNT {
            return Err(AnalysisError::InvalidAnswers {
                expected: QUESTION_COUNT,
                actual,
            });
        }

        if !self.llm.has_credential() {
            warn!(model = %self.llm.model_name(), "No API key configured, skipping analysis request");
            return Err(AnalysisError::MissingCredential);
        }

        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(build_excavation_prompt(answers)),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens)
        .with_response_schema(SCHEMA_NAME, talent_result_schema());

        info!(model = %self.llm.model_name(), "Requesting talent analysis");
        let response = self.llm.complete(request).await.map_err(|e| {
            warn!(error = %e, "Talent analysis request failed");
            AnalysisError::from(e)
        })?;

        let cost = costs::estimate(
            self.llm.cost_per_token(),
            response.input_tokens,
            response.output_tokens,
        );
        info!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %cost,
            response_id = response.response_id.as_deref().unwrap_or("-"),
            "Talent analysis response received"
        );
        if response.finish_reason == FinishReason::Length {
            warn!("Analysis response hit the token limit and may be truncated");
        }
        debug!(raw = %response.content, "Raw analysis response");

        parse_talent_response(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::error::LlmError;
    use crate::excavation::model::tests::sample_result;
    use crate::llm::provider::CompletionResponse;

    /// Records requests and replays a canned outcome.
    struct ScriptedLlm {
        credential: bool,
        reply: Result<String, String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn replying(content: &str) -> Self {
            Self {
                credential: true,
                reply: Ok(content.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                credential: true,
                reply: Err(reason.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        fn has_credential(&self) -> bool {
            self.credential
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    input_tokens: 120,
                    output_tokens: 300,
                    finish_reason: FinishReason::Stop,
                    response_id: Some("resp-1".to_string()),
                }),
                Err(reason) => Err(LlmError::RequestFailed {
                    provider: "scripted".to_string(),
                    reason: reason.clone(),
                }),
            }
        }
    }

    fn answers() -> Vec<String> {
        (1..=7).map(|i| format!("answer number {i}")).collect()
    }

    fn client(llm: Arc<ScriptedLlm>) -> AnalysisClient {
        AnalysisClient::new(llm, AnalysisConfig::default())
    }

    #[tokio::test]
    async fn sends_one_structured_request() {
        let llm = Arc::new(ScriptedLlm::replying(&serde_json::to_string(&sample_result()).unwrap()));
        let result = client(Arc::clone(&llm)).analyze(&answers()).await.unwrap();
        assert_eq!(result, sample_result());

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SYSTEM_INSTRUCTION);
        assert!(request.messages[1].content.contains("Fragment 7: answer number 7"));
        assert_eq!(request.response_schema.as_ref().unwrap().name, SCHEMA_NAME);
        assert_eq!(request.max_tokens, Some(2048));
    }

    #[tokio::test]
    async fn missing_credential_skips_request() {
        let llm = Arc::new(ScriptedLlm {
            credential: false,
            ..ScriptedLlm::replying("{}")
        });
        let err = client(Arc::clone(&llm)).analyze(&answers()).await.unwrap_err();
        assert_eq!(err, AnalysisError::MissingCredential);
        assert!(llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_request_failed() {
        let llm = Arc::new(ScriptedLlm::failing("HTTP 500"));
        let err = client(llm).analyze(&answers()).await.unwrap_err();
        assert_eq!(err, AnalysisError::RequestFailed("HTTP 500".to_string()));
    }

    #[tokio::test]
    async fn malformed_content_is_reported() {
        let llm = Arc::new(ScriptedLlm::replying(r#"{"manifesto": "only this"}"#));
        let err = client(llm).analyze(&answers()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn wrong_answer_count_is_rejected() {
        let llm = Arc::new(ScriptedLlm::replying("{}"));
        let mut six = answers();
        six.pop();
        let err = client(Arc::clone(&llm)).analyze(&six).await.unwrap_err();
        assert_eq!(err, AnalysisError::InvalidAnswers { expected: 7, actual: 6 });

        let mut blank = answers();
        blank[3] = "   ".to_string();
        let err = client(Arc::clone(&llm)).analyze(&blank).await.unwrap_err();
        assert_eq!(err, AnalysisError::InvalidAnswers { expected: 7, actual: 6 });
        assert!(llm.requests.lock().unwrap().is_empty());
    }
}
