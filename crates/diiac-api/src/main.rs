//! # diiac-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the optional YAML
//! file named by `DIIAC_CONFIG` plus environment overrides.

use std::path::PathBuf;

use anyhow::Context;
use diiac_api::state::AppState;
use diiac_governance::{GovernanceConfig, Orchestrator};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("DIIAC_LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config_path = std::env::var_os("DIIAC_CONFIG").map(PathBuf::from);
    let config = GovernanceConfig::load(config_path.as_deref()).map_err(|e| {
        tracing::error!("configuration failed: {e}");
        e
    })?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;

    let orchestrator = Orchestrator::from_config(&config).map_err(|e| {
        tracing::error!("orchestrator initialization failed: {e}");
        e
    })?;

    let mut state = AppState::new(orchestrator).with_metrics(metrics);
    if let Ok(origin) = std::env::var("DIIAC_CORS_ORIGIN") {
        state = state.with_cors_origin(origin);
    }

    let app = diiac_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("DIIaC API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
