mod config;
mod errors;
mod ingest;
mod routes;
mod state;
mod twin_core;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::github::GithubClient;
use crate::ingest::mainapp::MainAppClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::twin_core::SkillTwin;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skill Twin API v{}", env!("CARGO_PKG_VERSION"));

    // One shared HTTP client for both upstream connectors.
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    // The single process-wide twin. Handlers serialize mutations through
    // the lock; there is no cross-restart persistence by design.
    let state = AppState {
        twin: Arc::new(RwLock::new(SkillTwin::new())),
        github: Arc::new(GithubClient::new(
            http.clone(),
            config.github_api_url.clone(),
        )),
        main_app: Arc::new(MainAppClient::new(http, config.main_backend_url.clone())),
    };
    info!(
        "Twin initialized (main backend: {}, GitHub API: {})",
        config.main_backend_url, config.github_api_url
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
