//! # Role Middleware
//!
//! The caller's role arrives in the `x-role` header (`customer` or `admin`).
//! The middleware parses it into a [`CallerIdentity`] and injects it into the
//! request extensions; handlers extract it and call [`require_role`].
//!
//! A missing or unknown role is rejected with 401 before any handler runs.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-role";

/// Roles ordered by privilege: `Customer < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May capture human intent.
    Customer,
    /// Full access, including governed execution and trust inspection.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Identity of the caller, available to handlers via `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
}

impl CallerIdentity {
    /// Whether the caller holds at least `minimum`.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }
}

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// 403 unless the caller holds at least `minimum`.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

/// Parse `x-role` and inject the caller identity.
pub async fn role_middleware(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(ROLE_HEADER)
        .map(|v| v.to_str().map(|s| s.trim().to_owned()));

    match header {
        Some(Ok(raw)) => match Role::parse(&raw) {
            Some(role) => {
                request.extensions_mut().insert(CallerIdentity { role });
                next.run(request).await
            }
            None => {
                tracing::warn!(role = %raw, "rejected unknown role");
                AppError::Unauthorized(format!("unknown role '{raw}'")).into_response()
            }
        },
        Some(Err(_)) => {
            AppError::Unauthorized("x-role header is not valid ASCII".into()).into_response()
        }
        None => AppError::Unauthorized("missing x-role header".into()).into_response(),
    }
}
