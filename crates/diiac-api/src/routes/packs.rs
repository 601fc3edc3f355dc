//! # Decision-Pack Inspection
//!
//! Read-only views over a sealed execution: its manifest, the list of
//! report artefacts, and the raw bytes of a single artefact.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use diiac_core::ExecutionId;
use serde::Serialize;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReportList {
    pub execution_id: ExecutionId,
    pub reports: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/decision-pack/{execution_id}/manifest", get(get_manifest))
        .route("/executions/{execution_id}/reports", get(list_reports))
        .route("/executions/{execution_id}/reports/{file}", get(download_report))
}

/// GET /decision-pack/{execution_id}/manifest
async fn get_manifest(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(execution_id): Path<String>,
) -> Result<Response, AppError> {
    require_role(&caller, Role::Admin)?;
    let id = ExecutionId::parse(&execution_id)?;
    Ok(Json(state.orchestrator.manifest(&id)?).into_response())
}

/// GET /executions/{execution_id}/reports
async fn list_reports(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(execution_id): Path<String>,
) -> Result<Json<ReportList>, AppError> {
    require_role(&caller, Role::Admin)?;
    let id = ExecutionId::parse(&execution_id)?;
    let reports = state.orchestrator.list_reports(&id)?;
    Ok(Json(ReportList {
        execution_id: id,
        reports,
    }))
}

/// GET /executions/{execution_id}/reports/{file}
async fn download_report(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((execution_id, file)): Path<(String, String)>,
) -> Result<Response, AppError> {
    require_role(&caller, Role::Admin)?;
    let id = ExecutionId::parse(&execution_id)?;
    let bytes = state.orchestrator.read_report(&id, &file)?;
    let content_type = if file.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
