//! Request lifecycle: extract → assemble → ask the assistant → render.
//!
//! Nothing here fails. Extraction and assistant problems arrive as bracketed
//! placeholder text inside the generated content and flow on to the user.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assembler;
use crate::assistant::AssistantClient;
use crate::config::Config;
use crate::export;
use crate::extraction::TextExtractor;
use crate::models::DocumentRequest;
use crate::types::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    CollectingInput,
    Submitted,
    Extracting,
    Assembling,
    AwaitingAssistant,
    RenderingResult,
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub document_type: String,
    pub content: String,
    pub filename: String,
    pub greeting: Option<String>,
    pub date: Option<chrono::NaiveDate>,
}

impl GeneratedDocument {
    pub fn to_docx(&self) -> Result<Bytes, ExportError> {
        export::to_document(&self.content)
    }
}

pub struct DocumentPipeline {
    extractor: TextExtractor,
    assistant: AssistantClient,
}

impl DocumentPipeline {
    pub fn new(extractor: TextExtractor, assistant: AssistantClient) -> Self {
        Self { extractor, assistant }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TextExtractor::from_config(&config.extraction),
            AssistantClient::from_config(&config.assistant),
        )
    }

    pub async fn generate(&self, request: &DocumentRequest, cancel: &CancellationToken) -> GeneratedDocument {
        enter(Stage::Submitted);
        let attachments: usize = request.field_attachments.values().map(Vec::len).sum();
        info!(
            document_type = %request.document_type,
            fields = request.fields.len(),
            attachments,
            "Generating document"
        );

        enter(Stage::Assembling);
        let payload = assembler::assemble(request, &self.extractor).await;

        enter(Stage::AwaitingAssistant);
        let content = self.assistant.ask_with_cancel(&payload, cancel).await;

        enter(Stage::RenderingResult);
        let document = GeneratedDocument {
            document_type: request.document_type.clone(),
            filename: export::download_filename(&request.document_type),
            greeting: request.professional.greeting(),
            date: request.professional.date,
            content,
        };
        enter(Stage::Idle);
        document
    }
}

pub(crate) fn enter(stage: Stage) {
    debug!(stage = ?stage, "Pipeline stage");
}
