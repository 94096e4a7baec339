//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis_client::models::{
    AnalysisReport, AnalysisSummary, AnalyzeRequest, ChatReply, ChatRequest, ParseDebugReport,
    SessionCreated,
};
use crate::errors::AppError;
use crate::extraction::document::ExtractionMetadata;
use crate::extraction::handlers::{extract_upload, read_upload};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub metadata: ExtractionMetadata,
    pub analysis: AnalysisReport,
}

#[derive(Debug, Serialize)]
pub struct AnalysisHealthResponse {
    pub healthy: bool,
    pub analysis_api_url: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreated>, AppError> {
    let session_id = state.analysis.create_session().await?;
    info!(%session_id, "analysis session created");
    Ok(Json(SessionCreated { session_id }))
}

/// POST /api/v1/analyze
///
/// Extract → (create session if none given) → analyze.
/// Extraction errors stop the flow before the analysis API is called.
#[tracing::instrument(skip_all, fields(upload_id = %Uuid::new_v4()))]
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_upload(multipart, state.config.max_upload_bytes).await?;
    let extracted = extract_upload(&state, &form.document).await?;

    let session_id = match form.session_id {
        Some(id) => id,
        None => state.analysis.create_session().await?,
    };

    let analysis = state
        .analysis
        .analyze(&AnalyzeRequest {
            session_id: session_id.clone(),
            cv_text: extracted.text,
            filename: extracted.metadata.filename.clone(),
            file_size: extracted.metadata.size,
        })
        .await?;

    info!(
        %session_id,
        analysis_id = %analysis.id,
        ats_score = analysis.ats_score,
        "résumé analyzed"
    );

    Ok(Json(AnalyzeResponse {
        session_id,
        metadata: extracted.metadata,
        analysis,
    }))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    if request.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id cannot be empty".to_string()));
    }
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let reply = state.analysis.send_chat(&request).await?;
    Ok(Json(reply))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
) -> Result<Json<AnalysisReport>, AppError> {
    Ok(Json(state.analysis.get_analysis(&analysis_id).await?))
}

/// GET /api/v1/sessions/:id/analyses
pub async fn handle_session_analyses(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<AnalysisSummary>>, AppError> {
    Ok(Json(state.analysis.session_analyses(&session_id).await?))
}

/// GET /api/v1/analysis/health
pub async fn handle_analysis_health(State(state): State<AppState>) -> Json<AnalysisHealthResponse> {
    Json(AnalysisHealthResponse {
        healthy: state.analysis.health().await,
        analysis_api_url: state.config.analysis_api_url.clone(),
    })
}

/// POST /api/v1/analysis/debug-parse
///
/// Shows what the analysis API receives for an upload, for diagnosing
/// résumés that score unexpectedly low.
#[tracing::instrument(skip_all, fields(upload_id = %Uuid::new_v4()))]
pub async fn handle_debug_parse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseDebugReport>, AppError> {
    let form = read_upload(multipart, state.config.max_upload_bytes).await?;
    let extracted = extract_upload(&state, &form.document).await?;
    let report = state
        .analysis
        .debug_parse(&extracted.text, &extracted.metadata.filename)
        .await?;
    Ok(Json(report))
}
