mod config;
mod errors;
mod generation;
mod ingest;
mod llm_client;
mod portfolio;
mod render;
mod routes;
mod sanitize;
mod scoring;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{GeminiClient, ModelRouter};
use crate::render::default_page_config;
use crate::routes::build_router;
use crate::scoring::{ScorerOptions, TfIdfScorer};
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails without an API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumAI API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini client and candidate router
    let gemini = GeminiClient::new(config.google_api_key.clone(), config.api_base.clone())
        .context("failed to build Gemini HTTP client")?;
    let router = ModelRouter::new(Arc::new(gemini), config.model_candidates.clone());
    info!("Model candidates: {:?}", router.candidates());

    // Initialize ATS scorer once; requests share it
    let scorer = TfIdfScorer::new(ScorerOptions {
        use_idf: config.ats_use_idf,
        sublinear_tf: config.ats_sublinear_tf,
        ..ScorerOptions::default()
    })
    .context("failed to build ATS scorer")?;
    info!("ATS scorer ready: {:?}", scorer.options());

    let state = AppState {
        router,
        scorer: Arc::new(scorer),
        sessions: SessionStore::new(),
        page_config: default_page_config(),
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
