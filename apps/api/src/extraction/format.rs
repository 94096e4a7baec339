//! Format sniffing from the declared media type, falling back to the file name.

use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOC_MEDIA_TYPE: &str = "application/msword";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy binary Word document.
    Doc,
}

impl DocumentFormat {
    /// Media type wins when it names a supported format; otherwise the
    /// extension decides. Generic types like `application/octet-stream`
    /// therefore fall through to the extension.
    pub fn detect(media_type: &str, file_name: &str) -> Option<Self> {
        Self::from_media_type(media_type).or_else(|| Self::from_file_name(file_name))
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MEDIA_TYPE => Some(DocumentFormat::Pdf),
            DOCX_MEDIA_TYPE => Some(DocumentFormat::Docx),
            DOC_MEDIA_TYPE => Some(DocumentFormat::Doc),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let name = file_name.trim().to_lowercase();
        if name.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if name.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else if name.ends_with(".doc") {
            Some(DocumentFormat::Doc)
        } else {
            None
        }
    }
}
