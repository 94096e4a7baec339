//! Legacy binary `.doc` handling.
//!
//! This is deliberately lossy. The compound-file structure of Word 97-2003
//! documents is not parsed at all; the bytes are decoded as text and only
//! the runs of printable ASCII that happen to survive are kept. Formatting
//! tables, non-ASCII text and anything stored in other streams are lost.
//! Users get pointed at DOCX or PDF when nothing usable comes out.

use crate::extraction::error::ExtractionError;

/// Below this many characters the scan is treated as a failure.
pub const MIN_LEGACY_TEXT_CHARS: usize = 10;

pub fn scan_printable_text(data: &[u8]) -> Result<String, ExtractionError> {
    let decoded = String::from_utf8_lossy(data);

    let printable: String = decoded
        .chars()
        .map(|c| if is_printable(c) { c } else { ' ' })
        .collect();
    let text = printable.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() < MIN_LEGACY_TEXT_CHARS {
        return Err(ExtractionError::legacy_format_unsupported(format!(
            "only {} printable characters recovered from legacy DOC",
            text.chars().count()
        )));
    }

    Ok(text)
}

fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~' | '\n' | '\r' | '\t')
}
