//! Text Extractor
//!
//! Turns uploaded PDF, DOCX and image files into plain text. Every file is
//! handled on its own: a failure becomes an [`ExtractionOutcome::Failed`] for
//! that file and the rest of the batch carries on.

pub mod docx;
pub mod ocr;
pub mod pdf;

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::ExtractionConfig;
use crate::models::UploadedFile;
use crate::types::ExtractionError;

pub use ocr::OcrEngine;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Image,
}

impl FileKind {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type == PDF_MEDIA_TYPE {
            Some(FileKind::Pdf)
        } else if media_type == DOCX_MEDIA_TYPE {
            Some(FileKind::Docx)
        } else if media_type.starts_with("image/") {
            Some(FileKind::Image)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
            FileKind::Image => "image",
        }
    }
}

/// What came out of one uploaded file.
///
/// `Display` renders the bracketed placeholder texts shown to the user, so
/// callers that only want a string can call `to_string()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Text(String),
    NoText(FileKind),
    Unsupported(String),
    Failed(String),
}

impl ExtractionOutcome {
    fn from_raw(kind: FileKind, raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ExtractionOutcome::NoText(kind)
        } else {
            ExtractionOutcome::Text(trimmed.to_string())
        }
    }
}

impl std::fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionOutcome::Text(text) => f.write_str(text),
            ExtractionOutcome::NoText(kind) => write!(f, "[no extractable text: {}]", kind.name()),
            ExtractionOutcome::Unsupported(media_type) => {
                write!(f, "[unsupported file type: {}]", media_type)
            }
            ExtractionOutcome::Failed(message) => write!(f, "[extraction error: {}]", message),
        }
    }
}

pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
    ocr_language: String,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, ocr_language: impl Into<String>) -> Self {
        Self {
            ocr,
            ocr_language: ocr_language.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(ocr::default_engine(config), config.ocr_language.clone())
    }

    /// One string per input file, in input order.
    pub async fn extract(&self, files: &[UploadedFile]) -> Vec<String> {
        self.extract_outcomes(files)
            .await
            .into_iter()
            .map(|outcome| outcome.to_string())
            .collect()
    }

    /// Files are processed one after another, never in parallel.
    pub async fn extract_outcomes(&self, files: &[UploadedFile]) -> Vec<ExtractionOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.extract_one(file).await);
        }
        outcomes
    }

    pub async fn extract_one(&self, file: &UploadedFile) -> ExtractionOutcome {
        let Some(kind) = FileKind::from_media_type(&file.media_type) else {
            debug!(file = %file.name, media_type = %file.media_type, "Unsupported upload");
            return ExtractionOutcome::Unsupported(file.media_type.clone());
        };

        debug!(file = %file.name, kind = kind.name(), size = file.data.len(), "Extracting text");

        match self.read_text(kind, file).await {
            Ok(raw) => ExtractionOutcome::from_raw(kind, raw),
            Err(e) => {
                error!(file = %file.name, error = %e, "Failed to extract text");
                ExtractionOutcome::Failed(e.to_string())
            }
        }
    }

    async fn read_text(&self, kind: FileKind, file: &UploadedFile) -> Result<String, ExtractionError> {
        match kind {
            FileKind::Pdf => {
                let data = file.data.clone();
                run_blocking(move || pdf::extract_text(&data)).await
            }
            FileKind::Docx => {
                let data = file.data.clone();
                run_blocking(move || docx::extract_text(&data)).await
            }
            FileKind::Image => self.ocr.recognize(&file.data, &self.ocr_language).await,
        }
    }
}

async fn run_blocking<F>(f: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ExtractionError::Io(std::io::Error::other(e.to_string())))?
}
