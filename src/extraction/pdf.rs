use lopdf::Document;
use tracing::warn;

use crate::types::ExtractionError;

/// Text of every page, joined with newlines. A page whose text cannot be
/// decoded contributes an empty line rather than failing the document.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(ExtractionError::Pdf("document is encrypted".to_string()));
    }

    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| {
            doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                warn!(page = page_number, error = %e, "Skipping unreadable PDF page");
                String::new()
            })
        })
        .collect::<Vec<_>>();

    Ok(pages.join("\n"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// One page per entry; an empty entry gives a page without text.
    pub fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for text in pages {
            let content = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET")
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_text_from_digital_pdf() {
        let bytes = make_test_pdf(&["Hello World"]);
        let text = extract_text(&bytes).unwrap();
        assert!(text.contains("Hello World"), "got: {text:?}");
    }

    #[test]
    fn test_pages_are_joined_in_order() {
        let bytes = make_test_pdf(&["Alpha", "Omega"]);
        let text = extract_text(&bytes).unwrap();
        let alpha = text.find("Alpha").expect("first page text");
        let omega = text.find("Omega").expect("second page text");
        assert!(alpha < omega);
    }

    #[test]
    fn test_page_without_text_is_blank() {
        let bytes = make_test_pdf(&[""]);
        let text = extract_text(&bytes).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_invalid_pdf_returns_error() {
        assert!(matches!(extract_text(b"not a pdf"), Err(ExtractionError::Pdf(_))));
    }
}
