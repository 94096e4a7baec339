//! Lazily initialised parser engines, shared by every extraction call.
//!
//! The registry is built once at startup and handed to the pipeline through
//! `AppState`. Each engine initialises on first use; a failed initialisation
//! leaves the slot empty so the next request tries again.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::extraction::docx::{DocxEngine, OoxmlEngine};
use crate::extraction::error::ExtractionError;
use crate::extraction::pdf::{LopdfEngine, PdfEngine};

type Factory<T> = Box<dyn Fn() -> anyhow::Result<Arc<T>> + Send + Sync>;

/// One engine slot: a factory plus the cell it initialises.
pub struct Provider<T: ?Sized> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
    factory: Factory<T>,
}

impl<T: ?Sized + Send + Sync> Provider<T> {
    pub fn new(
        name: &'static str,
        factory: impl Fn() -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Returns the engine, initialising it on first call.
    pub async fn ensure_ready(&self) -> Result<Arc<T>, ExtractionError> {
        let engine = self
            .cell
            .get_or_try_init(|| async {
                (self.factory)()
                    .inspect(|_| info!(engine = self.name, "parser engine ready"))
                    .map_err(|e| {
                        error!(engine = self.name, error = %e, "parser engine failed to initialize");
                        ExtractionError::parser_init_failed(format!(
                            "Failed to initialize {} parser: {e}",
                            self.name
                        ))
                    })
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}

pub struct ParserRegistry {
    pdf: Provider<dyn PdfEngine>,
    docx: Provider<dyn DocxEngine>,
}

impl ParserRegistry {
    pub fn new(pdf: Provider<dyn PdfEngine>, docx: Provider<dyn DocxEngine>) -> Self {
        Self { pdf, docx }
    }

    pub fn pdf(&self) -> &Provider<dyn PdfEngine> {
        &self.pdf
    }

    pub fn docx(&self) -> &Provider<dyn DocxEngine> {
        &self.docx
    }
}

impl Default for ParserRegistry {
    /// `lopdf` for PDF, the zip/XML reader for DOCX.
    fn default() -> Self {
        Self::new(
            Provider::new("PDF", || Ok(Arc::new(LopdfEngine) as Arc<dyn PdfEngine>)),
            Provider::new("DOCX", || Ok(Arc::new(OoxmlEngine) as Arc<dyn DocxEngine>)),
        )
    }
}
