mod config;
mod consultants;
mod db;
mod errors;
mod inference;
mod leave;
mod models;
mod resume;
mod routes;
mod shortlist;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::inference::gemini::{GeminiEmbedder, GeminiGenerator, GeminiTransport};
use crate::inference::FallbackChain;
use crate::routes::build_router;
use crate::shortlist::shortlister::{ShortlistSettings, Shortlister};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roster API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    if config.seed_consultants {
        consultants::repository::seed_defaults(&db)
            .await
            .context("Failed to seed default consultants")?;
    }

    // Initialize inference chains
    let transport = GeminiTransport::new(config.gemini_api_key.clone(), &config.gemini_base_url)
        .context("Failed to build Gemini HTTP client")?;
    let generator = FallbackChain::new(
        GeminiGenerator::new(transport.clone()),
        config.generation_models.clone(),
    );
    info!("Text generation models: {}", generator.models().join(" -> "));

    let embedder = FallbackChain::new(
        GeminiEmbedder::new(transport),
        config.embedding_models.clone(),
    );
    info!("Embedding models: {}", embedder.models().join(" -> "));

    let shortlister = Shortlister::new(
        Arc::new(embedder),
        ShortlistSettings {
            default_threshold: config.shortlist_threshold,
            max_concurrency: config.embedding_concurrency,
            request_timeout: config.embedding_timeout,
        },
    );
    info!(
        "Shortlister ready (threshold {}, concurrency {}, timeout {:?})",
        config.shortlist_threshold, config.embedding_concurrency, config.embedding_timeout
    );

    // Build app state
    let state = AppState {
        db,
        generator,
        shortlister: Arc::new(shortlister),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
