mod analysis;
mod config;
mod errors;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::LlmResumeAnalyzer;
use crate::analysis::extractor::PdfTextExtractor;
use crate::analysis::session::SessionRegistry;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (a missing API key is not fatal)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let mut llm = LlmClient::new(config.anthropic_api_key.clone());
    if let Some(url) = &config.anthropic_api_url {
        llm = llm.with_endpoint(url.clone());
    }
    let analysis_configured = llm.is_configured();
    if analysis_configured {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        error!("ANTHROPIC_API_KEY is not set; analysis requests will fail until it is configured");
    }

    let sessions = SessionRegistry::new(
        Arc::new(PdfTextExtractor),
        Arc::new(LlmResumeAnalyzer::new(llm)),
        config.loading_grace,
        config.session_ttl,
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        sessions: Arc::new(sessions),
        analysis_configured,
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
