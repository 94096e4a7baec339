//! PDF text extraction.
//!
//! Two strategies live here:
//! - `extract_pages`: the primary path. Opens the document through a
//!   [`PdfEngine`], reads each page's text runs, and tolerates damaged pages.
//! - `scan_literal_strings`: a degraded best-effort mode that greps the raw
//!   bytes for `( ... )` literal strings. It only works on uncompressed
//!   content streams, which the PDF format does not guarantee, so a hit is
//!   luck rather than parsing.

use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::extraction::error::ExtractionError;

/// Below this many characters the primary path reports no readable text.
pub const MIN_PAGE_TEXT_CHARS: usize = 10;
/// The literal scan must produce strictly more than this many characters.
pub const MIN_FALLBACK_CHARS: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Engine seam
// ────────────────────────────────────────────────────────────────────────────

/// A PDF engine capable of opening a document for page-wise text access.
pub trait PdfEngine: Send + Sync {
    fn open(&self, data: &[u8]) -> Result<Box<dyn PdfPages>, ExtractionError>;
}

/// An opened PDF. Page numbers are 1-indexed.
pub trait PdfPages {
    fn page_count(&self) -> u32;
    fn text_runs(&self, page_number: u32) -> anyhow::Result<Vec<String>>;
}

/// Default engine backed by `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfEngine;

struct LopdfPages {
    document: lopdf::Document,
    page_count: u32,
}

impl PdfEngine for LopdfEngine {
    fn open(&self, data: &[u8]) -> Result<Box<dyn PdfPages>, ExtractionError> {
        let document = lopdf::Document::load_mem(data).map_err(|e| {
            if declares_encryption(data) {
                ExtractionError::password_protected(format!("encrypted PDF could not be opened: {e}"))
            } else {
                ExtractionError::invalid_document(format!("Invalid PDF structure: {e}"))
            }
        })?;

        if document.is_encrypted() {
            return Err(ExtractionError::password_protected(
                "PDF is encrypted and requires a password",
            ));
        }

        let page_count = document.get_pages().len() as u32;
        debug!(page_count, "PDF loaded");

        Ok(Box::new(LopdfPages {
            document,
            page_count,
        }))
    }
}

impl PdfPages for LopdfPages {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn text_runs(&self, page_number: u32) -> anyhow::Result<Vec<String>> {
        let text = self
            .document
            .extract_text(&[page_number])
            .map_err(|e| anyhow!("page {page_number}: {e}"))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

fn declares_encryption(data: &[u8]) -> bool {
    const MARKER: &[u8] = b"/Encrypt";
    data.windows(MARKER.len()).any(|window| window == MARKER)
}

// ────────────────────────────────────────────────────────────────────────────
// Primary strategy
// ────────────────────────────────────────────────────────────────────────────

/// Reads every page in order; pages that error or panic are skipped.
pub fn extract_pages(engine: &dyn PdfEngine, data: &[u8]) -> Result<String, ExtractionError> {
    let document = engine.open(data)?;
    let page_count = document.page_count();

    let mut pages = Vec::with_capacity(page_count as usize);
    for page_number in 1..=page_count {
        let runs = panic::catch_unwind(AssertUnwindSafe(|| document.text_runs(page_number)))
            .unwrap_or_else(|_| Err(anyhow!("engine panicked on page {page_number}")));

        match runs {
            Ok(runs) => {
                let page_text = join_runs(&runs);
                debug!(page_number, chars = page_text.len(), "page extracted");
                if !page_text.is_empty() {
                    pages.push(page_text);
                }
            }
            Err(e) => warn!(page_number, error = %e, "skipping unreadable PDF page"),
        }
    }

    let text = pages.join("\n\n").trim().to_string();
    let chars = text.chars().count();
    if chars < MIN_PAGE_TEXT_CHARS {
        return Err(ExtractionError::no_readable_text(format!(
            "{chars} characters extracted from {page_count} pages; the PDF may be image-based or scanned"
        )));
    }

    Ok(text)
}

fn join_runs(runs: &[String]) -> String {
    runs.iter()
        .map(|run| run.trim())
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Degraded fallback
// ────────────────────────────────────────────────────────────────────────────

static LITERAL_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("literal string pattern is valid"));

/// Best-effort scan of raw PDF bytes for parenthesised literal strings.
pub fn scan_literal_strings(data: &[u8]) -> Result<String, ExtractionError> {
    let raw = String::from_utf8_lossy(data);

    let text = LITERAL_STRING_RE
        .captures_iter(&raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|candidate| {
            candidate.chars().count() > 2 && candidate.chars().any(|c| c.is_ascii_alphabetic())
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let chars = text.chars().count();
    if chars <= MIN_FALLBACK_CHARS {
        return Err(ExtractionError::no_readable_text(format!(
            "literal string scan found only {chars} characters"
        )));
    }

    Ok(text)
}
