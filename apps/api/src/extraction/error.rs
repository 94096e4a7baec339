use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an extraction failed. Callers branch on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    UnsupportedFormat,
    ParserInitFailed,
    InvalidDocument,
    PasswordProtected,
    NoReadableText,
    LegacyFormatUnsupported,
    ExtractionFailed,
}

impl ExtractionErrorKind {
    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(self) -> &'static str {
        match self {
            ExtractionErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ExtractionErrorKind::ParserInitFailed => "PARSER_INIT_FAILED",
            ExtractionErrorKind::InvalidDocument => "INVALID_DOCUMENT",
            ExtractionErrorKind::PasswordProtected => "PASSWORD_PROTECTED",
            ExtractionErrorKind::NoReadableText => "NO_READABLE_TEXT",
            ExtractionErrorKind::LegacyFormatUnsupported => "LEGACY_FORMAT_UNSUPPORTED",
            ExtractionErrorKind::ExtractionFailed => "EXTRACTION_FAILED",
        }
    }

    /// What the user should do next.
    pub fn user_guidance(self) -> &'static str {
        match self {
            ExtractionErrorKind::UnsupportedFormat => {
                "Unsupported file format. Please upload PDF, DOC, or DOCX files."
            }
            ExtractionErrorKind::ParserInitFailed => {
                "Document parser initialization failed. Please refresh the page and try again."
            }
            ExtractionErrorKind::InvalidDocument => {
                "Invalid or corrupted file. Please re-save or re-export the document and try again."
            }
            ExtractionErrorKind::PasswordProtected => {
                "Password-protected documents are not supported. Please upload an unprotected version."
            }
            ExtractionErrorKind::NoReadableText => {
                "No readable text found. The document may be image-based or scanned; make sure it contains selectable text."
            }
            ExtractionErrorKind::LegacyFormatUnsupported => {
                "Failed to extract readable text from this DOC file. Please convert it to DOCX or PDF format."
            }
            ExtractionErrorKind::ExtractionFailed => {
                "Failed to read the document. Please try again or upload it in a different format."
            }
        }
    }
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified extraction failure with a free-text diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ExtractionError {
    kind: ExtractionErrorKind,
    detail: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unsupported_format(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::UnsupportedFormat, detail)
    }

    pub fn parser_init_failed(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::ParserInitFailed, detail)
    }

    pub fn invalid_document(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::InvalidDocument, detail)
    }

    pub fn password_protected(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::PasswordProtected, detail)
    }

    pub fn no_readable_text(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::NoReadableText, detail)
    }

    pub fn legacy_format_unsupported(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::LegacyFormatUnsupported, detail)
    }

    pub fn extraction_failed(detail: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::ExtractionFailed, detail)
    }

    pub fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_guidance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_detail() {
        let err = ExtractionError::no_readable_text("0 characters across 2 pages");
        assert_eq!(err.to_string(), "NO_READABLE_TEXT: 0 characters across 2 pages");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionErrorKind::LegacyFormatUnsupported).unwrap();
        assert_eq!(json, r#""legacy_format_unsupported""#);
    }

    #[test]
    fn test_legacy_guidance_recommends_conversion() {
        let guidance = ExtractionErrorKind::LegacyFormatUnsupported.user_guidance();
        assert!(guidance.contains("DOCX"));
        assert!(guidance.contains("PDF"));
    }

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(
            ExtractionError::password_protected("x").kind(),
            ExtractionErrorKind::PasswordProtected
        );
        assert_eq!(
            ExtractionError::invalid_document("x").kind(),
            ExtractionErrorKind::InvalidDocument
        );
        assert_eq!(
            ExtractionError::parser_init_failed("x").kind(),
            ExtractionErrorKind::ParserInitFailed
        );
    }
}
