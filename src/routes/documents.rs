use axum::{
    extract::{multipart::Field, Multipart, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::catalog;
use crate::export::{self, DOCX_CONTENT_TYPE};
use crate::models::{AppState, DocumentRequest, ExportRequest, GenerateResponse, Professional, UploadedFile};
use crate::session::session_id;
use crate::types::{AppError, AppResult};

const MAX_CRP_CHARS: usize = 10;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", post(generate_document))
        .route("/api/documents/export", post(export_document))
        .with_state(state)
}

async fn require_terms(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    match session_id(headers) {
        Some(id) if state.sessions.terms_accepted(id).await => Ok(()),
        _ => Err(AppError::TermsNotAccepted),
    }
}

/// Multipart form: `document_type`, `name`, `crp`, `date`, then
/// `text:<field>` values and `file:<field>` uploads (repeatable).
pub async fn generate_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<GenerateResponse>> {
    require_terms(&state, &headers).await?;

    let request = read_form(multipart).await?;
    info!(document_type = %request.document_type, "Received document request");

    let cancel = state.shutdown.child_token();
    let document = state.pipeline.generate(&request, &cancel).await;

    Ok(Json(GenerateResponse {
        document_type: document.document_type,
        content: document.content,
        filename: document.filename,
        greeting: document.greeting,
        date: document.date,
    }))
}

pub async fn export_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ExportRequest>,
) -> AppResult<Response> {
    require_terms(&state, &headers).await?;

    let bytes = export::to_document(&request.content)?;
    let filename = export::download_filename(&request.document_type);
    debug!(%filename, size = bytes.len(), "Exported document");

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn read_form(mut multipart: Multipart) -> AppResult<DocumentRequest> {
    let mut request = DocumentRequest::default();
    let mut professional = Professional::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(form_field) = name.strip_prefix("file:") {
            if let Some(file) = read_file(field).await? {
                request
                    .field_attachments
                    .entry(form_field.to_string())
                    .or_default()
                    .push(file);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        match name.as_str() {
            "document_type" => request.document_type = value.trim().to_string(),
            "name" => professional.name = value.trim().to_string(),
            "crp" => professional.registration = value.trim().chars().take(MAX_CRP_CHARS).collect(),
            "date" => professional.date = chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok(),
            other => {
                if let Some(form_field) = other.strip_prefix("text:") {
                    request.field_values.insert(form_field.to_string(), value);
                }
            }
        }
    }

    request.fields = catalog::fields_for(&request.document_type);
    request.professional = professional;
    Ok(request)
}

/// Browsers post an empty part for a file input left blank; those are
/// dropped.
async fn read_file(field: Field<'_>) -> AppResult<Option<UploadedFile>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let media_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string()
        });
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    if file_name.is_empty() && data.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile::new(file_name, media_type, data)))
}
