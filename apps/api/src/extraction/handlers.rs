//! Axum route handlers for document uploads.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::DateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::document::format_file_size;
use crate::extraction::{DocumentInfo, ExtractionResult, UploadedDocument};
use crate::state::AppState;

/// Multipart framing allowance on top of the upload ceiling, so oversize
/// files reach our own check instead of a bare body-limit rejection.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Fields accepted by the upload endpoints.
#[derive(Debug)]
pub struct UploadForm {
    pub document: UploadedDocument,
    pub session_id: Option<String>,
}

/// Reads the `file` part plus optional `last_modified` (epoch millis) and
/// `session_id` text parts. Unknown parts are ignored. `max_upload_bytes`
/// only shapes the error when the body limit cuts the stream short.
pub async fn read_upload(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<UploadForm, AppError> {
    let mut document: Option<UploadedDocument> = None;
    let mut last_modified = None;
    let mut session_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "upload", max_upload_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let media_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, &file_name, max_upload_bytes))?;
                document = Some(UploadedDocument::new(file_name, media_type, data));
            }
            "last_modified" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "last_modified", max_upload_bytes))?;
                let millis = raw.trim().parse::<i64>().map_err(|_| {
                    AppError::Validation(format!(
                        "last_modified must be epoch milliseconds, got '{raw}'"
                    ))
                })?;
                last_modified = DateTime::from_timestamp_millis(millis);
            }
            "session_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "session_id", max_upload_bytes))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    session_id = Some(raw.to_string());
                }
            }
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?
        .with_last_modified(last_modified);

    Ok(UploadForm {
        document,
        session_id,
    })
}

fn multipart_error(e: MultipartError, part: &str, max_upload_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(part, None, max_upload_bytes as u64)
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// `size` is unknown when the body limit stopped the read part way.
fn too_large(name: &str, size: Option<u64>, limit: u64) -> AppError {
    let size = size.map_or_else(|| "too large".to_string(), format_file_size);
    AppError::PayloadTooLarge(format!(
        "{name} is {size}; the limit is {}",
        format_file_size(limit)
    ))
}

/// Enforces the upload ceiling, then runs the extraction pipeline.
pub async fn extract_upload(
    state: &AppState,
    document: &UploadedDocument,
) -> Result<ExtractionResult, AppError> {
    let limit = state.config.max_upload_bytes as u64;
    if document.size() > limit {
        return Err(too_large(&document.file_name, Some(document.size()), limit));
    }

    Ok(state.extractor.extract(document).await?)
}

/// POST /api/v1/documents/inspect
///
/// Describes an upload without parsing it.
#[tracing::instrument(skip_all, fields(upload_id = %Uuid::new_v4()))]
pub async fn handle_inspect(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DocumentInfo>, AppError> {
    let form = read_upload(multipart, state.config.max_upload_bytes).await?;
    Ok(Json(DocumentInfo::describe(&form.document)))
}

/// POST /api/v1/documents/extract
///
/// Returns the normalized text and metadata of the uploaded résumé.
#[tracing::instrument(skip_all, fields(upload_id = %Uuid::new_v4()))]
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, AppError> {
    let form = read_upload(multipart, state.config.max_upload_bytes).await?;
    let result = extract_upload(&state, &form.document).await?;
    Ok(Json(result))
}
