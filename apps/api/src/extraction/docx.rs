//! DOCX raw-text extraction over the OOXML package.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::extraction::error::ExtractionError;

const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// An engine that turns a DOCX package into raw text.
pub trait DocxEngine: Send + Sync {
    fn raw_text(&self, data: &[u8]) -> Result<String>;
}

/// Reads `word/document.xml` straight out of the zip container.
///
/// Output mirrors a raw-text dump: run text is concatenated, `w:tab` becomes
/// a tab, `w:br`/`w:cr` a newline, and every paragraph ends with a blank line.
#[derive(Debug, Default)]
pub struct OoxmlEngine;

impl DocxEngine for OoxmlEngine {
    fn raw_text(&self, data: &[u8]) -> Result<String> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(data)).context("not a valid OOXML package")?;

        let mut xml = String::new();
        archive
            .by_name(MAIN_DOCUMENT_PART)
            .with_context(|| format!("package has no {MAIN_DOCUMENT_PART}"))?
            .read_to_string(&mut xml)
            .with_context(|| format!("{MAIN_DOCUMENT_PART} is not valid UTF-8"))?;

        document_xml_text(&xml)
    }
}

/// Paragraphs can nest (text boxes live inside a run of the outer
/// paragraph), so open paragraphs form a stack. A finished inner paragraph
/// is folded into its parent, which keeps document order.
fn document_xml_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event().context("malformed document.xml")? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            // tab stops in paragraph properties are also `w:tab`; only runs count
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if run_depth > 0 => push_text(&mut paragraphs, &mut out, "\t"),
                b"br" | b"cr" if run_depth > 0 => push_text(&mut paragraphs, &mut out, "\n"),
                b"p" => push_text(&mut paragraphs, &mut out, "\n\n"),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape().context("invalid text escape")?;
                push_text(&mut paragraphs, &mut out, &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" => {
                    let finished = paragraphs.pop().unwrap_or_default();
                    if let Some(parent) = paragraphs.last_mut() {
                        if !parent.is_empty() && !parent.ends_with('\n') {
                            parent.push_str("\n\n");
                        }
                    }
                    push_text(&mut paragraphs, &mut out, &finished);
                    push_text(&mut paragraphs, &mut out, "\n\n");
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

/// Appends to the innermost open paragraph, or to the output when none is open.
fn push_text(paragraphs: &mut [String], out: &mut String, text: &str) {
    match paragraphs.last_mut() {
        Some(paragraph) => paragraph.push_str(text),
        None => out.push_str(text),
    }
}

/// DOCX strategy: engine text, trimmed, must be non-empty.
pub fn extract_text(engine: &dyn DocxEngine, data: &[u8]) -> Result<String, ExtractionError> {
    let raw = engine
        .raw_text(data)
        .map_err(|e| ExtractionError::extraction_failed(format!("Failed to parse DOCX file: {e:#}")))?;

    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractionError::no_readable_text(
            "No readable text found in DOCX file",
        ));
    }

    Ok(text.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;
    use crate::extraction::error::ExtractionErrorKind;

    /// Wraps paragraph XML in a minimal DOCX package.
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer.start_file(MAIN_DOCUMENT_PART, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn paragraph(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }

    #[test]
    fn test_single_paragraph() {
        let docx = build_docx(&paragraph("Jane Doe — Software Engineer"));
        let text = extract_text(&OoxmlEngine, &docx).unwrap();
        assert_eq!(text, "Jane Doe — Software Engineer");
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let body = format!("{}{}", paragraph("Jane Doe"), paragraph("Rust &amp; Go"));
        let text = extract_text(&OoxmlEngine, &build_docx(&body)).unwrap();
        assert_eq!(text, "Jane Doe\n\nRust & Go");
    }

    #[test]
    fn test_runs_tabs_and_breaks() {
        let body = r#"<w:p><w:r><w:t>Skills:</w:t><w:tab/><w:t>Rust</w:t></w:r><w:r><w:br/><w:t>Kafka</w:t></w:r></w:p>"#;
        let text = extract_text(&OoxmlEngine, &build_docx(body)).unwrap();
        assert_eq!(text, "Skills:\tRust\nKafka");
    }

    #[test]
    fn test_tab_stop_definitions_ignored() {
        let body = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Profile</w:t></w:r></w:p>"#;
        let text = extract_text(&OoxmlEngine, &build_docx(body)).unwrap();
        assert_eq!(text, "Profile");
    }

    #[test]
    fn test_text_box_paragraph_keeps_outer_run() {
        let body = r#"<w:p><w:r><w:t>Contact</w:t><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>jane@example.com</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict><w:tab/><w:t>London</w:t><w:br/><w:t>UK</w:t></w:r></w:p>"#;
        let text = extract_text(&OoxmlEngine, &build_docx(body)).unwrap();
        assert_eq!(text, "Contact\n\njane@example.com\n\n\tLondon\nUK");
    }

    #[test]
    fn test_table_cells_are_included() {
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("2019-2023"),
            paragraph("Acme Corp")
        );
        let text = extract_text(&OoxmlEngine, &build_docx(&body)).unwrap();
        assert_eq!(text, "2019-2023\n\nAcme Corp");
    }

    #[test]
    fn test_deleted_and_field_text_ignored() {
        let body = r#"<w:p><w:r><w:instrText>PAGE</w:instrText></w:r><w:del><w:r><w:delText>old</w:delText></w:r></w:del><w:r><w:t>Current title</w:t></w:r></w:p>"#;
        let text = extract_text(&OoxmlEngine, &build_docx(body)).unwrap();
        assert_eq!(text, "Current title");
    }

    #[test]
    fn test_empty_document_is_no_readable_text() {
        let docx = build_docx("<w:p/><w:p><w:r><w:t>   </w:t></w:r></w:p>");
        let err = extract_text(&OoxmlEngine, &docx).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::NoReadableText);
    }

    #[test]
    fn test_not_a_zip_is_extraction_failed() {
        let err = extract_text(&OoxmlEngine, b"plain text pretending to be docx").unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::ExtractionFailed);
        assert!(err.detail().contains("Failed to parse DOCX file"));
    }

    #[test]
    fn test_missing_document_part_is_extraction_failed() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let data = writer.finish().unwrap().into_inner();

        let err = extract_text(&OoxmlEngine, &data).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::ExtractionFailed);
        assert!(err.detail().contains("word/document.xml"));
    }
}
