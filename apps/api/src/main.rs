mod analysis;
mod analysis_client;
mod config;
mod errors;
mod extraction;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis_client::AnalysisClient;
use crate::config::Config;
use crate::extraction::{DocumentExtractor, ParserRegistry};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Parser engines load on first use, not here
    let extractor = Arc::new(DocumentExtractor::new(Arc::new(ParserRegistry::default())));

    let analysis = AnalysisClient::new(
        &config.analysis_api_url,
        Duration::from_secs(config.analysis_timeout_secs),
    )?;
    info!("Analysis client initialized ({})", analysis.base_url());

    info!(
        "Upload ceiling: {}",
        extraction::document::format_file_size(config.max_upload_bytes as u64)
    );

    let state = AppState {
        config: config.clone(),
        extractor,
        analysis: Arc::new(analysis),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
