//! # Trust State

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use diiac_governance::TrustState;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/trust", get(trust_state))
}

/// GET /trust — Verify the full ledger chain and report its health.
async fn trust_state(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<TrustState>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.orchestrator.trust_state()?))
}
