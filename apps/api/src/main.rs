mod coaching;
mod config;
mod db;
mod errors;
mod extract;
mod interviews;
mod llm_client;
mod models;
mod roster;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::coaching::jobs::CoachingJobs;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::roster::snapshot::{RosterCell, RosterSnapshot};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the backing store
    let store = open_store(&config.store).await?;

    // Initial load. A schema problem here ends the process: nothing downstream
    // can run against a table without its key columns.
    let snapshot = RosterSnapshot::load(store.as_ref())
        .await
        .context("loading roster at startup")?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.coaching_timeout
    );

    // Build app state
    let state = AppState {
        store,
        roster: Arc::new(RosterCell::new(snapshot)),
        coach: Arc::new(llm),
        jobs: CoachingJobs::new(),
        coaching_timeout: config.coaching_timeout,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the manager UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
