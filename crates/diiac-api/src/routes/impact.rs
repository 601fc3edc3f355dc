//! # Policy Impact

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use diiac_core::PolicyLevel;
use diiac_governance::{assess_policy_impact, PolicyImpact};
use serde::Deserialize;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImpactRequest {
    #[serde(default)]
    pub policy_level: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/impact/policy", post(assess))
}

/// POST /api/impact/policy — Severity rating for a policy level (default P1).
async fn assess(
    caller: CallerIdentity,
    body: Result<Json<ImpactRequest>, JsonRejection>,
) -> Result<Json<PolicyImpact>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let level = match req.policy_level.as_deref() {
        Some(raw) => raw.parse::<PolicyLevel>()?,
        None => PolicyLevel::default(),
    };
    Ok(Json(assess_policy_impact(level)))
}
