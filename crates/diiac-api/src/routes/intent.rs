//! # Human-Intent Capture

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    /// Stored document name, `<unix-millis>.json`.
    pub saved: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/human-input", post(capture_intent))
}

/// POST /api/human-input — Store any JSON document as the latest intent.
async fn capture_intent(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CaptureResponse>, AppError> {
    require_role(&caller, Role::Customer)?;
    let document = extract_json(body)?;
    let saved = state.orchestrator.capture_intent(&document)?;
    Ok(Json(CaptureResponse { saved }))
}
