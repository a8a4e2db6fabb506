use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::pipeline::DocumentPipeline;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub pipeline: Arc<DocumentPipeline>,
    /// Cancelled on shutdown; aborts in-flight assistant polling.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, pipeline: DocumentPipeline) -> Self {
        Self {
            sessions: SessionStore::with_ttl(config.server.session_ttl()),
            config,
            pipeline: Arc::new(pipeline),
            shutdown: CancellationToken::new(),
        }
    }
}

/// A file as received from the form. Lives for one request only.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// Who is signing the document. Shown back to the user, not sent to the
/// assistant.
#[derive(Debug, Clone, Default)]
pub struct Professional {
    pub name: String,
    /// Regional council registration (CRP)
    pub registration: String,
    pub date: Option<chrono::NaiveDate>,
}

impl Professional {
    pub fn greeting(&self) -> Option<String> {
        if self.name.is_empty() || self.registration.is_empty() {
            return None;
        }
        Some(format!("Olá, {}! | CRP: {}", self.name, self.registration))
    }
}

/// One form submission.
#[derive(Debug, Clone, Default)]
pub struct DocumentRequest {
    pub document_type: String,
    pub fields: Vec<String>,
    pub field_values: HashMap<String, String>,
    pub field_attachments: HashMap<String, Vec<UploadedFile>>,
    pub professional: Professional,
}

impl DocumentRequest {
    /// Request for a catalog type with the catalog's field list.
    pub fn for_type(document_type: &str) -> Self {
        Self {
            document_type: document_type.to_string(),
            fields: crate::catalog::fields_for(document_type),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, field: &str, value: impl Into<String>) -> Self {
        self.field_values.insert(field.to_string(), value.into());
        self
    }

    pub fn with_attachment(mut self, field: &str, file: UploadedFile) -> Self {
        self.field_attachments
            .entry(field.to_string())
            .or_default()
            .push(file);
        self
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct GenerateResponse {
    pub document_type: String,
    pub content: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<chrono::NaiveDate>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ExportRequest {
    pub document_type: String,
    pub content: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
