use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::format::DocumentFormat;

/// A file as received from the client. Cheap to clone: the content is a
/// reference-counted `Bytes` buffer.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    /// Declared media type; empty when the client sent none.
    pub media_type: String,
    pub data: Bytes,
    pub last_modified: Option<DateTime<Utc>>,
}

impl UploadedDocument {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: data.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: Option<DateTime<Utc>>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::detect(&self.media_type, &self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_modified: Option<DateTime<Utc>>,
    pub word_count: usize,
    pub character_count: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Builds the result from final normalized text; counts never look at
    /// the raw engine output.
    pub fn from_text(document: &UploadedDocument, text: String) -> Self {
        let stats = TextStats::of(&text);
        Self {
            metadata: ExtractionMetadata {
                filename: document.file_name.clone(),
                size: document.size(),
                media_type: document.media_type.clone(),
                last_modified: document.last_modified,
                word_count: stats.word_count,
                character_count: stats.character_count,
                line_count: stats.line_count,
            },
            text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub word_count: usize,
    pub character_count: usize,
    pub line_count: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            // Standalone punctuation such as "—" or "•" is not a word
            word_count: text
                .split_whitespace()
                .filter(|token| token.chars().any(char::is_alphanumeric))
                .count(),
            character_count: text.chars().count(),
            // `split` always yields at least one segment
            line_count: text.split('\n').count(),
        }
    }
}

/// Diagnostic view of an upload, returned by the inspect endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub size: u64,
    pub size_formatted: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_modified: Option<DateTime<Utc>>,
    pub is_supported: bool,
    pub extension: Option<String>,
    pub detected_format: Option<DocumentFormat>,
}

impl DocumentInfo {
    pub fn describe(document: &UploadedDocument) -> Self {
        let detected_format = document.format();
        Self {
            name: document.file_name.clone(),
            size: document.size(),
            size_formatted: format_file_size(document.size()),
            media_type: document.media_type.clone(),
            last_modified: document.last_modified,
            is_supported: super::is_supported_format(document),
            extension: document
                .file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .filter(|ext| !ext.is_empty()),
            detected_format,
        }
    }
}

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Human-readable size, 1024-based, at most two decimals: `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}
