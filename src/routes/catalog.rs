use axum::{extract::Path, routing::get, Json, Router};

use crate::catalog::{self, CatalogEntry};

pub fn router() -> Router {
    Router::new()
        .route("/api/catalog", get(list_types))
        .route("/api/catalog/{document_type}", get(fields_for_type))
}

async fn list_types() -> Json<Vec<CatalogEntry>> {
    Json(catalog::catalog())
}

/// Unknown types answer with an empty list, not a 404.
async fn fields_for_type(Path(document_type): Path<String>) -> Json<Vec<String>> {
    Json(catalog::fields_for(&document_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{body_string, get};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_fields_for_encoded_label() {
        let response = router()
            .oneshot(get("/api/catalog/Parecer%20Psicol%C3%B3gico", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fields: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(fields, catalog::fields_for("Parecer Psicológico"));
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty_list() {
        let response = router().oneshot(get("/api/catalog/Outro", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_list_types() {
        let response = router().oneshot(get("/api/catalog", None)).await.unwrap();
        let body = body_string(response).await;
        assert!(body.contains("Declaração Psicológica"));
        assert!(body.contains("referências"));
    }
}
