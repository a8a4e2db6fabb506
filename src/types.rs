// Shared error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Failure while pulling text out of a single uploaded file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    Pdf(String),

    #[error("DOCX parsing failed: {0}")]
    Docx(String),

    #[error("image decoding failed: {0}")]
    Image(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while talking to the remote assistant service.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("run ended with status '{status}'")]
    RunFailed { status: String },

    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("response not found")]
    NoReply,

    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("DOCX write failed: {0}")]
    Docx(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Terms of use have not been accepted")]
    TermsNotAccepted,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::TermsNotAccepted => StatusCode::FORBIDDEN,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Export(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::TermsNotAccepted.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InvalidRequest("missing".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_assistant_error_messages() {
        let err = AssistantError::Api {
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(err.to_string(), "API error (401): Incorrect API key provided");

        let err = AssistantError::RunFailed { status: "expired".into() };
        assert_eq!(err.to_string(), "run ended with status 'expired'");
    }
}
