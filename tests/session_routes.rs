//! REST surface tests, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use talent_archaeologist::config::AnalysisConfig;
use talent_archaeologist::error::LlmError;
use talent_archaeologist::excavation::{
    AnalysisClient, ExcavationManager, ExcavationRouteState, WizardPhase, excavation_routes,
};
use talent_archaeologist::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

/// Provider that always fails; keeps analysis off the network.
struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(LlmError::RequestFailed {
            provider: "failing".to_string(),
            reason: "offline".to_string(),
        })
    }
}

/// Provider that never answers, so the session stays in Analyzing.
struct HangingLlm;

#[async_trait]
impl LlmProvider for HangingLlm {
    fn model_name(&self) -> &str {
        "hanging"
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        std::future::pending::<()>().await;
        Ok(CompletionResponse {
            content: String::new(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

fn app_with(llm: Arc<dyn LlmProvider>) -> (Router, Arc<ExcavationManager>) {
    let manager = ExcavationManager::new(AnalysisClient::new(llm, AnalysisConfig::default()));
    let app = excavation_routes(ExcavationRouteState {
        manager: manager.clone(),
    });
    (app, manager)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn questions_endpoint_lists_seven_prompts() {
    let (app, _) = app_with(Arc::new(FailingLlm));
    let (status, body) = call(&app, "GET", "/api/questions", None).await;

    assert_eq!(status, StatusCode::OK);
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 7);
    assert_eq!(questions[0]["index"], 0);
    assert!(questions[6]["helperText"].as_str().is_some());
    assert!(questions[6]["placeholderText"].as_str().is_some());
}

#[tokio::test]
async fn fresh_session_is_welcome() {
    let (app, _) = app_with(Arc::new(FailingLlm));
    let (status, body) = call(&app, "GET", "/api/session", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "welcome");
    assert_eq!(body["answered"], 0);
    assert_eq!(body["total_questions"], 7);
}

#[tokio::test]
async fn start_and_answer_advance_the_session() {
    let (app, _) = app_with(Arc::new(FailingLlm));

    let (status, body) = call(&app, "POST", "/api/session/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "excavating");
    assert_eq!(body["progress_label"], "Fragment 1 / 7");

    let (status, body) = call(
        &app,
        "POST",
        "/api/session/answer",
        Some(json!({"answer": "I fixed bikes"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question_index"], 1);
    assert_eq!(body["answered"], 1);
    assert_eq!(body["action_label"], "Next");
}

#[tokio::test]
async fn short_answer_is_unprocessable() {
    let (app, _) = app_with(Arc::new(FailingLlm));
    call(&app, "POST", "/api/session/start", None).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/session/answer",
        Some(json!({"answer": "ok"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("too short"));
    assert_eq!(body["status"]["question_index"], 0);
    assert_eq!(body["status"]["answered"], 0);
}

#[tokio::test]
async fn answer_before_start_conflicts() {
    let (app, _) = app_with(Arc::new(FailingLlm));
    let (status, body) = call(
        &app,
        "POST",
        "/api/session/answer",
        Some(json!({"answer": "I fixed bikes"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"]["phase"], "welcome");
}

#[tokio::test]
async fn back_from_first_question_returns_to_welcome() {
    let (app, _) = app_with(Arc::new(FailingLlm));
    call(&app, "POST", "/api/session/start", None).await;

    let (status, body) = call(&app, "POST", "/api/session/back", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "welcome");
}

#[tokio::test]
async fn seventh_answer_enters_analyzing_and_reset_abandons_it() {
    let (app, manager) = app_with(Arc::new(HangingLlm));
    call(&app, "POST", "/api/session/start", None).await;
    for i in 0..7 {
        let answer = format!("answer number {}", i + 1);
        let (status, _) = call(
            &app,
            "POST",
            "/api/session/answer",
            Some(json!({ "answer": answer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(manager.phase().await, WizardPhase::Analyzing);

    let (status, _) = call(&app, "POST", "/api/session/back", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, "POST", "/api/session/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "welcome");
    assert_eq!(body["answered"], 0);
}

#[tokio::test]
async fn failed_analysis_reports_notice_in_status() {
    let (app, manager) = app_with(Arc::new(FailingLlm));
    let mut events = manager.subscribe();
    call(&app, "POST", "/api/session/start", None).await;
    for i in 0..7 {
        let answer = format!("answer number {}", i + 1);
        call(&app, "POST", "/api/session/answer", Some(json!({ "answer": answer }))).await;
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while manager.phase().await != WizardPhase::Welcome {
            let _ = events.recv().await;
        }
    })
    .await
    .expect("analysis never resolved");

    let (_, body) = call(&app, "GET", "/api/session", None).await;
    assert_eq!(body["phase"], "welcome");
    assert_eq!(
        body["last_failure"],
        "Excavation interrupted: request failed: offline"
    );
}
