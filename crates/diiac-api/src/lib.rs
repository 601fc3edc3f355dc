//! # diiac-api — HTTP Surface of the Governance Trust Layer
//!
//! Thin Axum handlers over [`diiac_governance::Orchestrator`]. Every route
//! except the health checks and `/metrics` requires an `x-role` header.
//!
//! ## API Surface
//!
//! | Route                                         | Role     | Module               |
//! |-----------------------------------------------|----------|----------------------|
//! | `POST /api/human-input`                       | customer | [`routes::intent`]   |
//! | `POST /govern/decision`                       | admin    | [`routes::govern`]   |
//! | `GET  /trust`                                 | admin    | [`routes::trust`]    |
//! | `GET  /decision-pack/{id}/manifest`           | admin    | [`routes::packs`]    |
//! | `GET  /executions/{id}/reports`               | admin    | [`routes::packs`]    |
//! | `GET  /executions/{id}/reports/{file}`        | admin    | [`routes::packs`]    |
//! | `POST /api/impact/policy`                     | admin    | [`routes::impact`]   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer (optional) → TraceLayer → RoleMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health checks and `/metrics` are mounted outside the role middleware.
pub fn app(state: AppState) -> Router {
    let cors = state.cors_origin.as_deref().and_then(cors_layer);

    let api = Router::new()
        .merge(routes::intent::router())
        .merge(routes::govern::router())
        .merge(routes::trust::router())
        .merge(routes::packs::router())
        .merge(routes::impact::router())
        .layer(from_fn(auth::role_middleware))
        .layer(TraceLayer::new_for_http());

    let open = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics));

    let router = Router::new().merge(open).merge(api).with_state(state);
    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(value) => Some(
            CorsLayer::new()
                .allow_origin(value)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(auth::ROLE_HEADER),
                ]),
        ),
        Err(_) => {
            tracing::warn!(origin, "ignoring invalid CORS origin");
            None
        }
    }
}

/// Liveness: always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness: 503 once the ledger has frozen.
async fn readiness(State(state): State<AppState>) -> Response {
    if state.orchestrator.ledger().is_frozen() {
        (StatusCode::SERVICE_UNAVAILABLE, "ledger frozen").into_response()
    } else {
        "ready".into_response()
    }
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
