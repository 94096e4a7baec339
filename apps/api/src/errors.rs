use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis_client::AnalysisError;
use crate::extraction::{ExtractionError, ExtractionErrorKind};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Analysis API error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(e) => match e.kind() {
                ExtractionErrorKind::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ExtractionErrorKind::ParserInitFailed => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            AppError::Analysis(AnalysisError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Analysis(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::NotFound(msg) => json!({ "code": "NOT_FOUND", "message": msg }),
            AppError::Validation(msg) => json!({ "code": "VALIDATION_ERROR", "message": msg }),
            AppError::PayloadTooLarge(msg) => {
                json!({ "code": "PAYLOAD_TOO_LARGE", "message": msg })
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction failed: {e}");
                json!({
                    "code": e.kind().code(),
                    "kind": e.kind(),
                    "message": e.user_message(),
                    "detail": e.detail(),
                })
            }
            AppError::Analysis(AnalysisError::NotFound(msg)) => {
                json!({ "code": "NOT_FOUND", "message": msg })
            }
            AppError::Analysis(e) => {
                tracing::error!("Analysis API error: {e}");
                json!({
                    "code": "ANALYSIS_API_ERROR",
                    "message": "The analysis service is unavailable. Please try again."
                })
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({
                    "code": "INTERNAL_ERROR",
                    "message": "An internal server error occurred"
                })
            }
        };

        (status, Json(json!({ "error": body }))).into_response()
    }
}
