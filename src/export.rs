//! Document Exporter
//!
//! Writes assistant output as a plain DOCX, one paragraph per line.

use std::io::Cursor;

use bytes::Bytes;
use docx_rust::document::Paragraph;
use docx_rust::Docx;

use crate::types::ExportError;

pub const DOCX_CONTENT_TYPE: &str = crate::extraction::DOCX_MEDIA_TYPE;

pub fn to_document(text: &str) -> Result<Bytes, ExportError> {
    let mut docx = Docx::default();
    for line in text.split('\n') {
        let line = xml_safe(line);
        docx.document
            .push(Paragraph::default().push_text(line.trim().to_string()));
    }

    let cursor = docx
        .write(Cursor::new(Vec::new()))
        .map_err(|e| ExportError::Docx(format!("{:?}", e)))?;

    Ok(Bytes::from(cursor.into_inner()))
}

/// Swap characters outside the XML 1.0 `Char` production for spaces. A
/// `document.xml` holding a form feed or vertical tab cannot be opened.
fn xml_safe(line: &str) -> String {
    line.chars()
        .map(|c| if is_xml_char(c) { c } else { ' ' })
        .collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Replace every character outside `[A-Za-z0-9_.-]` with an underscore.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Download name for a document type label.
pub fn download_filename(document_type: &str) -> String {
    format!("{}.docx", sanitize_filename(document_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::extract_text;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Laudo Psicológico"), "Laudo_Psicol_gico");
        assert_eq!(sanitize_filename("Relatório Multiprofissional"), "Relat_rio_Multiprofissional");
        assert_eq!(sanitize_filename("a-b_c.d"), "a-b_c.d");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_sanitize_is_deterministic_and_restricted() {
        let input = "Atestado Psicológico (cópia) #2";
        let first = sanitize_filename(input);
        assert_eq!(first, sanitize_filename(input));
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename("Parecer Psicológico"), "Parecer_Psicol_gico.docx");
    }

    #[test]
    fn test_round_trip_keeps_lines_as_paragraphs() {
        let text = "LAUDO PSICOLÓGICO\nIdentificação\n\nConclusão: sem alterações";
        let bytes = to_document(text).unwrap();

        assert_eq!(&bytes[..2], b"PK");
        assert_eq!(extract_text(&bytes).unwrap(), text);
    }

    #[test]
    fn test_error_text_still_exports() {
        let text = "[error interacting with assistant: API error (401): invalid key]";
        let bytes = to_document(text).unwrap();
        assert_eq!(extract_text(&bytes).unwrap(), text);
    }

    #[test]
    fn test_control_characters_still_produce_a_readable_docx() {
        let text = "linha\u{000B}com tab vertical\u{0007}\npágina\u{000C}seguinte";
        let bytes = to_document(text).unwrap();
        assert_eq!(
            extract_text(&bytes).unwrap(),
            "linha com tab vertical\npágina seguinte"
        );
    }

    #[test]
    fn test_xml_char_ranges() {
        assert!(is_xml_char('\t'));
        assert!(is_xml_char('ç'));
        assert!(is_xml_char('\u{1F600}'));
        assert!(!is_xml_char('\u{0000}'));
        assert!(!is_xml_char('\u{001F}'));
        assert!(!is_xml_char('\u{FFFE}'));
    }
}
