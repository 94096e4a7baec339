use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service status plus whether each parser engine has been loaded yet.
/// Engines load lazily, so `false` before the first upload is normal.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let registry = state.extractor.registry();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-api",
        "parsers": {
            "pdf": registry.pdf().is_ready(),
            "docx": registry.docx().is_ready(),
        }
    }))
}
