//! Content Assembler
//!
//! Builds the single plain-text message sent to the assistant: a header naming
//! the document type, then one labelled block per field in catalog order.

use crate::extraction::TextExtractor;
use crate::models::DocumentRequest;
use crate::pipeline::{enter, Stage};

/// Assemble the payload, extracting text from attachments on the way.
/// A field with attachments uses their text and ignores its free text.
pub async fn assemble(request: &DocumentRequest, extractor: &TextExtractor) -> String {
    let mut content = header(&request.document_type);

    for field in &request.fields {
        let attachments = request
            .field_attachments
            .get(field)
            .filter(|files| !files.is_empty());

        let body = match attachments {
            Some(files) => {
                enter(Stage::Extracting);
                let text = extractor.extract(files).await.join("\n");
                enter(Stage::Assembling);
                text
            }
            None => request.field_values.get(field).cloned().unwrap_or_default(),
        };
        push_block(&mut content, field, &body);
    }

    content
}

fn header(document_type: &str) -> String {
    format!("Tipo de documento: {}\n\n", document_type)
}

fn push_block(content: &mut String, field: &str, body: &str) {
    content.push_str(field);
    content.push_str(":\n");
    content.push_str(body);
    content.push_str("\n\n");
}
