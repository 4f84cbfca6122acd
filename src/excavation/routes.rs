//! REST endpoints for driving a session over HTTP.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::WizardError;

use super::manager::ExcavationManager;
use super::questions::QUESTIONS;

/// Shared state for excavation routes.
#[derive(Clone)]
pub struct ExcavationRouteState {
    pub manager: Arc<ExcavationManager>,
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    answer: String,
}

/// GET /api/questions
async fn list_questions() -> impl IntoResponse {
    Json(QUESTIONS)
}

/// GET /api/session
async fn get_session(State(state): State<ExcavationRouteState>) -> impl IntoResponse {
    Json(state.manager.status().await)
}

/// POST /api/session/start
async fn start(State(state): State<ExcavationRouteState>) -> Response {
    let outcome = state.manager.start().await;
    respond(&state, outcome).await
}

/// POST /api/session/answer
///
/// 422 when the answer is too short, 409 outside excavation. The body is
/// always the current session status.
async fn answer(
    State(state): State<ExcavationRouteState>,
    Json(body): Json<AnswerBody>,
) -> Response {
    let outcome = state.manager.submit_answer(&body.answer).await.map(|_| ());
    respond(&state, outcome).await
}

/// POST /api/session/back
async fn back(State(state): State<ExcavationRouteState>) -> Response {
    let outcome = state.manager.go_back().await.map(|_| ());
    respond(&state, outcome).await
}

/// POST /api/session/reset
async fn reset(State(state): State<ExcavationRouteState>) -> Response {
    state.manager.reset().await;
    respond(&state, Ok(())).await
}

async fn respond(state: &ExcavationRouteState, outcome: Result<(), WizardError>) -> Response {
    let status = state.manager.status().await;
    match outcome {
        Ok(()) => Json(status).into_response(),
        Err(e) => {
            let code = match e {
                WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WizardError::InvalidTransition { .. } => StatusCode::CONFLICT,
            };
            (
                code,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "status": status,
                })),
            )
                .into_response()
        }
    }
}

/// Build the excavation REST routes.
pub fn excavation_routes(state: ExcavationRouteState) -> Router {
    Router::new()
        .route("/api/questions", get(list_questions))
        .route("/api/session", get(get_session))
        .route("/api/session/start", post(start))
        .route("/api/session/answer", post(answer))
        .route("/api/session/back", post(back))
        .route("/api/session/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
