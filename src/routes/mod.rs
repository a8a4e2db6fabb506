//! HTTP Routes
//!
//! - `/` - Terms-of-use gate, then the document form
//! - `/terms/accept` - Records acceptance for the visitor's session
//! - `/api/catalog` - Document types and their fields
//! - `/api/documents` - Generate a draft, export it as DOCX
//! - `/api/health` - Health check

pub mod catalog;
pub mod documents;
pub mod health;
pub mod terms;
pub mod ui;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .merge(ui::router(state.clone()))
        .merge(terms::router(state.clone()))
        .merge(documents::router(state))
        .merge(catalog::router())
        .merge(health::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assistant::tests::{client, FakeBackend};
    use crate::config::{AssistantConfig, Config, ExtractionConfig, ServerConfig};
    use crate::extraction::tests::extractor_with_ocr;
    use crate::pipeline::DocumentPipeline;
    use crate::session::SESSION_COOKIE;
    use axum::body::Body;
    use axum::http::{header, Request, Response};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    pub fn test_config() -> Config {
        Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                max_upload_bytes: 1024 * 1024,
                session_ttl_secs: 3600,
            },
            assistant: AssistantConfig {
                api_key: String::new(),
                assistant_id: "asst_test".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                poll_interval_ms: 5,
                timeout_secs: 5,
            },
            extraction: ExtractionConfig::default(),
        }
    }

    pub fn test_state(backend: Arc<FakeBackend>) -> AppState {
        let pipeline = DocumentPipeline::new(
            extractor_with_ocr(Ok("texto do anexo")),
            client(backend, Duration::from_secs(5)),
        );
        AppState::new(test_config(), pipeline)
    }

    /// State plus a session id that has already accepted the terms.
    pub async fn accepted_state(backend: Arc<FakeBackend>) -> (AppState, Uuid) {
        let state = test_state(backend);
        let id = Uuid::new_v4();
        state.sessions.accept_terms(id).await;
        (state, id)
    }

    pub fn cookie(id: Uuid) -> String {
        format!("{}={}", SESSION_COOKIE, id)
    }

    pub fn get(uri: &str, session: Option<Uuid>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(id) = session {
            builder = builder.header(header::COOKIE, cookie(id));
        }
        builder.body(Body::empty()).unwrap()
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
