use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect},
    routing::post,
    Router,
};
use tracing::info;
use uuid::Uuid;

use crate::models::AppState;
use crate::session::{session_cookie, session_id};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/terms/accept", post(accept_terms))
        .with_state(state)
}

async fn accept_terms(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let id = session_id(&headers).unwrap_or_else(Uuid::new_v4);
    state.sessions.accept_terms(id).await;
    info!(session = %id, "Terms of use accepted");

    ([(header::SET_COOKIE, session_cookie(id))], Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::tests::FakeBackend;
    use crate::routes::tests::{cookie, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crate::session::SessionStore;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_accept_marks_existing_session() {
        let state = test_state(Arc::new(FakeBackend::replying(Vec::new(), Vec::new())));
        let id = Uuid::new_v4();

        let request = Request::builder()
            .method("POST")
            .uri("/terms/accept")
            .header(header::COOKIE, cookie(id))
            .body(Body::empty())
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        assert!(state.sessions.terms_accepted(id).await);
    }

    #[tokio::test]
    async fn test_accept_without_cookie_issues_one() {
        let state = test_state(Arc::new(FakeBackend::replying(Vec::new(), Vec::new())));

        let request = Request::builder()
            .method("POST")
            .uri("/terms/accept")
            .body(Body::empty())
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, set_cookie.split(';').next().unwrap().parse().unwrap());
        let id = session_id(&headers).unwrap();
        assert!(state.sessions.terms_accepted(id).await);
    }

    #[tokio::test]
    async fn test_anonymous_accepts_do_not_accumulate() {
        let mut state = test_state(Arc::new(FakeBackend::replying(Vec::new(), Vec::new())));
        state.sessions = SessionStore::with_ttl(Duration::from_millis(20));

        for _ in 0..50 {
            let request = Request::builder()
                .method("POST")
                .uri("/terms/accept")
                .body(Body::empty())
                .unwrap();
            router(state.clone()).oneshot(request).await.unwrap();
        }
        assert_eq!(state.sessions.len().await, 50);

        tokio::time::sleep(Duration::from_millis(40)).await;
        let request = Request::builder()
            .method("POST")
            .uri("/terms/accept")
            .body(Body::empty())
            .unwrap();
        router(state.clone()).oneshot(request).await.unwrap();

        assert_eq!(state.sessions.len().await, 1);
    }
}
