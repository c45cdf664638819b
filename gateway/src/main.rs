mod api;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use pilot_core::{Orchestrator, Settings};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Repo Pilot Gateway Initializing...");

    let settings = Settings::from_env().context("failed to load settings")?;
    info!("Loaded settings: {:?}", settings);

    // Clients are built once and shared read-only by every request.
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings));
    let state = AppState { orchestrator };

    let cors = routes::cors(&settings.allowed_origin)
        .with_context(|| format!("invalid allowed origin '{}'", settings.allowed_origin))?;
    let app = routes::router(state, cors);

    let listener = TcpListener::bind(settings.bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!("Gateway listening on {}...", settings.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
