//! Document extraction pipeline: résumé upload in, plain text out.
//!
//! `DocumentExtractor::extract` sniffs the format, walks that format's
//! ordered [`Strategy`] list, and returns the first success. When every
//! strategy fails, the error from the first one is returned. Size limits are
//! the caller's job.

pub mod document;
pub mod docx;
pub mod error;
pub mod format;
pub mod handlers;
pub mod legacy_doc;
pub mod pdf;
pub mod registry;
pub mod strategy;

use std::sync::Arc;

use tracing::{info, warn};

pub use document::{DocumentInfo, ExtractionResult, UploadedDocument};
pub use error::{ExtractionError, ExtractionErrorKind};
pub use registry::ParserRegistry;
pub use strategy::Strategy;

/// True when the media type or the file extension names PDF, DOC or DOCX.
pub fn is_supported_format(document: &UploadedDocument) -> bool {
    document.format().is_some()
}

pub struct DocumentExtractor {
    registry: Arc<ParserRegistry>,
}

impl DocumentExtractor {
    pub fn new(registry: Arc<ParserRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    #[tracing::instrument(
        skip(self, document),
        fields(
            filename = %document.file_name,
            media_type = %document.media_type,
            size = document.size(),
        )
    )]
    pub async fn extract(
        &self,
        document: &UploadedDocument,
    ) -> Result<ExtractionResult, ExtractionError> {
        let format = document.format().ok_or_else(|| {
            ExtractionError::unsupported_format(format!(
                "'{}' ({}) is not a PDF, DOC or DOCX file",
                document.file_name,
                if document.media_type.is_empty() {
                    "no media type"
                } else {
                    document.media_type.as_str()
                }
            ))
        })?;

        let mut first_error: Option<ExtractionError> = None;

        for &strategy in Strategy::for_format(format) {
            match strategy.run(&self.registry, document.data.clone()).await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        first_error.get_or_insert_with(|| {
                            ExtractionError::no_readable_text(format!(
                                "{} produced no text",
                                strategy.name()
                            ))
                        });
                        continue;
                    }

                    if first_error.is_some() {
                        info!(strategy = strategy.name(), "fallback extraction succeeded");
                    }
                    let result = ExtractionResult::from_text(document, text);
                    info!(
                        strategy = strategy.name(),
                        words = result.metadata.word_count,
                        chars = result.metadata.character_count,
                        "document extracted"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "extraction strategy failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| {
            ExtractionError::extraction_failed(format!("no extraction strategy for {format:?}"))
        }))
    }
}
