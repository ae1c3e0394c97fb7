pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session API: one session per client screen
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/file",
            post(handlers::handle_select_file),
        )
        .route(
            "/api/v1/sessions/:id/analyze",
            post(handlers::handle_analyze_session),
        )
        .route(
            "/api/v1/sessions/:id/view",
            get(handlers::handle_session_view),
        )
        // Stateless one-shot analysis
        .route("/api/v1/analyze", post(handlers::handle_analyze_once))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::analysis::analyzer::ResumeAnalyzer;
    use crate::analysis::extractor::{ExtractError, TextExtractor};
    use crate::analysis::session::SessionRegistry;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::models::resume::{AnalyzedRecord, Skills};

    const BOUNDARY: &str = "resume-analyzer-test-boundary";

    struct EchoExtractor;

    #[async_trait]
    impl TextExtractor for EchoExtractor {
        async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
            Ok(String::from_utf8_lossy(&document).into_owned())
        }
    }

    /// Names the candidate after the first line of text.
    struct FirstLineAnalyzer;

    #[async_trait]
    impl ResumeAnalyzer for FirstLineAnalyzer {
        async fn analyze(&self, resume_text: &str) -> Result<AnalyzedRecord, LlmError> {
            Ok(AnalyzedRecord {
                name: resume_text.lines().next().map(str::to_string),
                skills: Some(Skills::Flat(vec!["Rust".to_string()])),
                ..Default::default()
            })
        }
    }

    fn app() -> Router {
        let sessions = SessionRegistry::new(
            Arc::new(EchoExtractor),
            Arc::new(FirstLineAnalyzer),
            Duration::ZERO,
            Duration::from_secs(60),
        );
        build_router(AppState {
            config: Config::default(),
            sessions: Arc::new(sessions),
            analysis_configured: true,
        })
    }

    fn multipart(file_name: &str, media_type: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {media_type}\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn with_uri(mut request: Request<Body>, uri: &str) -> Request<Body> {
        *request.uri_mut() = uri.parse().unwrap();
        request
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> Uuid {
        let response = app
            .clone()
            .oneshot(post_empty("/api/v1/sessions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["session_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["analysis_configured"], true);
    }

    #[tokio::test]
    async fn test_session_flow_select_analyze_view() {
        let app = app();
        let id = create_session(&app).await;

        let selected = app
            .clone()
            .oneshot(with_uri(
                multipart("cv.pdf", "application/pdf", "Grace Hopper\nCOBOL"),
                &format!("/api/v1/sessions/{id}/file"),
            ))
            .await
            .unwrap();
        assert_eq!(selected.status(), StatusCode::OK);
        let selected = json_body(selected).await;
        assert_eq!(selected["file_name"], "cv.pdf");
        assert_eq!(selected["can_analyze"], true);

        let analyzed = app
            .clone()
            .oneshot(post_empty(&format!("/api/v1/sessions/{id}/analyze")))
            .await
            .unwrap();
        let analyzed = json_body(analyzed).await;
        assert_eq!(analyzed["phase"], "displaying");
        assert_eq!(analyzed["record"]["name"], "Grace Hopper");
        assert_eq!(analyzed["render"]["sections"][0]["kind"], "skills");

        let view = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/view"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(view.status(), StatusCode::OK);
        let html = to_bytes(view.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains("Grace Hopper"));
        assert!(html.contains("animation-delay: 0.15s"));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_reported_in_session() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(with_uri(
                multipart("cv.txt", "text/plain", "hello"),
                &format!("/api/v1/sessions/{id}/file"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["error_kind"], "input_validation");
        assert!(body["file_name"].is_null());
        assert!(body["render"].is_null());
    }

    #[tokio::test]
    async fn test_view_without_result_is_not_found() {
        let app = app();
        let id = create_session(&app).await;
        let response = app
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/view"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let response = app()
            .oneshot(post_empty(&format!(
                "/api/v1/sessions/{}/analyze",
                Uuid::new_v4()
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app();
        let id = create_session(&app).await;
        let delete = || {
            Request::delete(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };
        let first = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(first.status(), StatusCode::NO_CONTENT);
        let second = app.oneshot(delete()).await.unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_one_shot_analysis() {
        let response = app()
            .oneshot(with_uri(
                multipart("cv.pdf", "application/pdf", "Alan Turing"),
                "/api/v1/analyze",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["record"]["name"], "Alan Turing");
        assert_eq!(body["render"]["name"]["text"], "Alan Turing");
    }

    #[tokio::test]
    async fn test_one_shot_empty_document_is_unprocessable() {
        let response = app()
            .oneshot(with_uri(
                multipart("cv.pdf", "application/pdf", "   "),
                "/api/v1/analyze",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_one_shot_wrong_type_is_bad_request() {
        let response = app()
            .oneshot(with_uri(
                multipart("cv.png", "image/png", "png"),
                "/api/v1/analyze",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
