pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::errors::AppError;
use crate::extraction::handlers as extraction;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + extraction::MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Document API
        .route(
            "/api/v1/documents/inspect",
            post(extraction::handle_inspect),
        )
        .route(
            "/api/v1/documents/extract",
            post(extraction::handle_extract),
        )
        // Analysis API
        .route("/api/v1/sessions", post(analysis::handle_create_session))
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/chat", post(analysis::handle_chat))
        .route("/api/v1/analyses/:id", get(analysis::handle_get_analysis))
        .route(
            "/api/v1/sessions/:id/analyses",
            get(analysis::handle_session_analyses),
        )
        .route(
            "/api/v1/analysis/health",
            get(analysis::handle_analysis_health),
        )
        .route(
            "/api/v1/analysis/debug-parse",
            post(analysis::handle_debug_parse),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
