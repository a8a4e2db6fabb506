use std::io::Cursor;

use docx_rust::document::BodyContent;
use docx_rust::{Docx, DocxFile};

use crate::types::ExtractionError;

/// Paragraph texts of a DOCX, one per line.
pub fn extract_text(docx_bytes: &[u8]) -> Result<String, ExtractionError> {
    let file = DocxFile::from_reader(Cursor::new(docx_bytes))
        .map_err(|e| ExtractionError::Docx(format!("{:?}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| ExtractionError::Docx(format!("{:?}", e)))?;

    Ok(paragraph_texts(&docx).join("\n"))
}

/// Top-level body paragraphs in document order. Tables and other block
/// content are skipped.
pub fn paragraph_texts(docx: &Docx<'_>) -> Vec<String> {
    docx.document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(paragraph) => Some(paragraph.text()),
            _ => None,
        })
        .collect()
}
