//! # Governed Execution
//!
//! `provider` is either a bare name or an object carrying the levels:
//!
//! ```json
//! { "provider": "ChatGPT", "reasoning_level": "R4", "policy_level": "P3" }
//! { "provider": { "provider": "ChatGPT", "reasoning_level": "R4" } }
//! ```
//!
//! Omitted levels default to R2 / P1. Unknown levels are rejected with 422.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use diiac_core::{PolicyLevel, ProviderId, ReasoningLevel};
use diiac_governance::{ExecutionOutcome, ExecutionRequest};
use serde::{Deserialize, Serialize};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProviderField {
    Name(String),
    Detailed(ProviderSelection),
}

#[derive(Debug, Deserialize)]
pub struct ProviderSelection {
    pub provider: String,
    #[serde(default)]
    pub reasoning_level: Option<String>,
    #[serde(default)]
    pub policy_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GovernDecisionRequest {
    pub provider: ProviderField,
    #[serde(default)]
    pub reasoning_level: Option<String>,
    #[serde(default)]
    pub policy_level: Option<String>,
}

impl GovernDecisionRequest {
    /// Levels nested in the provider object win over top-level ones.
    fn into_execution_request(self) -> Result<ExecutionRequest, AppError> {
        let (name, reasoning, policy) = match self.provider {
            ProviderField::Name(name) => (name, self.reasoning_level, self.policy_level),
            ProviderField::Detailed(sel) => (
                sel.provider,
                sel.reasoning_level.or(self.reasoning_level),
                sel.policy_level.or(self.policy_level),
            ),
        };
        Ok(ExecutionRequest {
            provider: ProviderId::new(name)?,
            reasoning_level: match reasoning {
                Some(raw) => raw.parse::<ReasoningLevel>()?,
                None => ReasoningLevel::default(),
            },
            policy_level: match policy {
                Some(raw) => raw.parse::<PolicyLevel>()?,
                None => PolicyLevel::default(),
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GovernDecisionResponse {
    pub execution_state: ExecutionOutcome,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/govern/decision", post(govern_decision))
}

/// POST /govern/decision — Run one governed execution to a sealed record.
async fn govern_decision(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<GovernDecisionRequest>, JsonRejection>,
) -> Result<Json<GovernDecisionResponse>, AppError> {
    require_role(&caller, Role::Admin)?;
    let request = extract_json(body)?.into_execution_request()?;
    let execution_state = state.orchestrator.execute(request).await?;
    Ok(Json(GovernDecisionResponse { execution_state }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Result<ExecutionRequest, AppError> {
        serde_json::from_value::<GovernDecisionRequest>(json)
            .unwrap()
            .into_execution_request()
    }

    #[test]
    fn bare_provider_uses_defaults() {
        let req = parse(serde_json::json!({ "provider": "ChatGPT" })).unwrap();
        assert_eq!(req.provider.as_str(), "ChatGPT");
        assert_eq!(req.reasoning_level, ReasoningLevel::R2);
        assert_eq!(req.policy_level, PolicyLevel::P1);
    }

    #[test]
    fn nested_levels_override_top_level() {
        let req = parse(serde_json::json!({
            "provider": { "provider": "Copilot", "reasoning_level": "R5" },
            "reasoning_level": "R0",
            "policy_level": "P4"
        }))
        .unwrap();
        assert_eq!(req.provider.as_str(), "Copilot");
        assert_eq!(req.reasoning_level, ReasoningLevel::R5);
        assert_eq!(req.policy_level, PolicyLevel::P4);
    }

    #[test]
    fn unknown_level_is_validation_failure() {
        let err = parse(serde_json::json!({ "provider": "x", "policy_level": "P9" })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn blank_provider_rejected() {
        let err = parse(serde_json::json!({ "provider": "   " })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
