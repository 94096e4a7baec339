use std::sync::Arc;

use crate::analysis_client::AnalysisApi;
use crate::config::Config;
use crate::extraction::DocumentExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the parser registry; engines initialise on first upload.
    pub extractor: Arc<DocumentExtractor>,
    /// Remote ATS analysis API. Swappable for tests.
    pub analysis: Arc<dyn AnalysisApi>,
}
