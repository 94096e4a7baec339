use bytes::Bytes;
use tokio::task;

use crate::extraction::error::ExtractionError;
use crate::extraction::format::DocumentFormat;
use crate::extraction::registry::ParserRegistry;
use crate::extraction::{docx, legacy_doc, pdf};

/// One way of turning a document's bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PdfPages,
    /// Degraded: raw-byte literal string scan.
    PdfLiteralScan,
    OoxmlText,
    /// Degraded: printable-ASCII scan of a binary `.doc`.
    LegacyDocScan,
}

impl Strategy {
    /// Ordered strategies for a format. The first success wins.
    pub fn for_format(format: DocumentFormat) -> &'static [Strategy] {
        match format {
            DocumentFormat::Pdf => &[Strategy::PdfPages, Strategy::PdfLiteralScan],
            DocumentFormat::Docx => &[Strategy::OoxmlText],
            DocumentFormat::Doc => &[Strategy::LegacyDocScan],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::PdfPages => "pdf_pages",
            Strategy::PdfLiteralScan => "pdf_literal_scan",
            Strategy::OoxmlText => "ooxml_text",
            Strategy::LegacyDocScan => "legacy_doc_scan",
        }
    }

    /// Runs the strategy on the blocking pool. Engines are resolved first so
    /// initialisation failures surface as `ParserInitFailed`.
    pub async fn run(
        self,
        registry: &ParserRegistry,
        data: Bytes,
    ) -> Result<String, ExtractionError> {
        match self {
            Strategy::PdfPages => {
                let engine = registry.pdf().ensure_ready().await?;
                run_blocking(self, move || pdf::extract_pages(engine.as_ref(), &data)).await
            }
            Strategy::PdfLiteralScan => {
                run_blocking(self, move || pdf::scan_literal_strings(&data)).await
            }
            Strategy::OoxmlText => {
                let engine = registry.docx().ensure_ready().await?;
                run_blocking(self, move || docx::extract_text(engine.as_ref(), &data)).await
            }
            Strategy::LegacyDocScan => {
                run_blocking(self, move || legacy_doc::scan_printable_text(&data)).await
            }
        }
    }
}

async fn run_blocking<F>(strategy: Strategy, f: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    task::spawn_blocking(f).await.map_err(|e| {
        ExtractionError::extraction_failed(format!("{} aborted: {e}", strategy.name()))
    })?
}
