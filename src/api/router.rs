use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::documents;
use super::health;
use super::state::AppState;

/// Room for multipart framing and the non-file fields
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .policy()
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Document parsing API
        .nest("/api", documents::create_documents_router(state.clone()))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{
        DomainError, Element, ElementKind, ParsingGateway, PartitionRequest, UploadPolicy,
    };
    use crate::infrastructure::{RateLimitConfig, RateLimiter};

    const BOUNDARY: &str = "X-DOCVIEW-BOUNDARY";

    /// Returns a fixed result for every call
    struct StubGateway {
        result: Result<Vec<Element>, DomainError>,
    }

    #[async_trait]
    impl ParsingGateway for StubGateway {
        async fn partition(&self, _request: PartitionRequest) -> Result<Vec<Element>, DomainError> {
            self.result.clone()
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn elements() -> Vec<Element> {
        vec![
            Element::new(ElementKind::Title, "1").with_text("Intro"),
            Element::new(ElementKind::NarrativeText, "2").with_text("Hello world"),
        ]
    }

    fn app_with(result: Result<Vec<Element>, DomainError>, quota: u32) -> (Router, AppState) {
        let gateway: Arc<dyn ParsingGateway> = Arc::new(StubGateway { result });
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::new(
            quota,
            chrono::Duration::seconds(60),
        )));
        let state = AppState::new(gateway, UploadPolicy::default(), limiter);

        (create_router(state.clone()), state)
    }

    fn app() -> (Router, AppState) {
        app_with(Ok(elements()), 10)
    }

    fn multipart_body(content_type: &str, extra: &[(&str, &str)]) -> Body {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"doc.pdf\"\r\nContent-Type: {content_type}\r\n\r\n%PDF-1.7 test\r\n"
        );

        for (name, value) in extra {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }

        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn upload_request(uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("x-forwarded-for", "203.0.113.7")
            .body(body)
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_parse_returns_chunks_and_rendered_text() {
        let (app, _) = app();

        let response = app
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "9");

        let json = json_body(response).await;
        assert_eq!(json["chunks"][0]["heading"], "Intro");
        assert_eq!(json["rendered"]["format"], "readable");
        assert_eq!(json["rendered"]["body"], "## Intro\n\nHello world");
    }

    #[tokio::test]
    async fn test_parse_raw_format() {
        let (app, _) = app();

        let response = app
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[("format", "raw")]),
            ))
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["rendered"]["format"], "raw_json");
    }

    #[tokio::test]
    async fn test_parse_rejects_unsupported_type() {
        let (app, _) = app();

        let response = app
            .oneshot(upload_request("/api/parse", multipart_body("text/plain", &[])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(
            json["error"]["message"],
            "Unsupported file type. Please upload a PDF or image file."
        );
    }

    #[tokio::test]
    async fn test_parse_gateway_failure_is_bad_gateway() {
        let (app, _) = app_with(Err(DomainError::gateway_status("HTTP 500", 500, "boom")), 10);

        let response = app
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["upstream_status"], 500);
    }

    #[tokio::test]
    async fn test_parse_headings_only_is_unprocessable() {
        let (app, _) = app_with(
            Ok(vec![Element::new(ElementKind::Title, "1").with_text("Lonely")]),
            10,
        );

        let response = app
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_parse_rate_limited() {
        let (app, _) = app_with(Ok(elements()), 1);

        let first = app
            .clone()
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[]),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(upload_request(
                "/api/parse",
                multipart_body("application/pdf", &[]),
            ))
            .await
            .unwrap();

        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers()["x-ratelimit-remaining"], "0");
        assert!(second.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_upload_settles_to_ready() {
        let (app, state) = app();

        let response = app
            .clone()
            .oneshot(upload_request(
                "/api/upload",
                multipart_body("application/pdf", &[("hi_res", "true")]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = json_body(response).await;
        assert_eq!(json["status"], "uploading");
        assert_eq!(json["filename"], "doc.pdf");

        let mut rx = state.orchestrator.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| s.status == crate::domain::UploadStatus::Ready),
        )
        .await
        .unwrap()
        .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/upload/document")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["body"], "## Intro\n\nHello world");
    }

    #[tokio::test]
    async fn test_upload_rejection_reports_error_state() {
        let (app, _) = app();

        let response = app
            .oneshot(upload_request("/api/upload", multipart_body("text/plain", &[])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(
            json["error_message"],
            "Unsupported file type. Please upload a PDF or image file."
        );
    }

    #[tokio::test]
    async fn test_document_not_found_before_upload() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/upload/document")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_toggle_and_reset() {
        let (app, _) = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload/toggle-raw")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(response).await["show_raw_json"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["status"], "idle");
        assert_eq!(json["show_raw_json"], false);
    }
}
