//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Governance failures keep their taxonomy code (`GENERATION_FAILURE`,
//! `CHAIN_INTEGRITY_FAILURE`, ...) in the response body. Every 5xx is logged
//! and returned without the underlying detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diiac_governance::{ErrorKind, GovernanceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or unknown role header (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Role insufficient for the route (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A governance operation failed; status follows its kind.
    #[error(transparent)]
    Governance(#[from] GovernanceError),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILURE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Governance(e) => (status_for_kind(e.kind()), e.kind().as_str()),
        }
    }
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::PreconditionFailure => StatusCode::CONFLICT,
        ErrorKind::ConcurrencyViolation => StatusCode::CONFLICT,
        ErrorKind::ValidationFailure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::GenerationFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::ChainIntegrityFailure => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Detail-free message returned for 5xx responses.
fn public_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_GATEWAY => "Content generation failed",
        StatusCode::SERVICE_UNAVAILABLE => "Ledger integrity check failed; appends are suspended",
        _ => "An internal error occurred",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
            public_message(status).to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<diiac_core::ValidationError> for AppError {
    fn from(err: diiac_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
