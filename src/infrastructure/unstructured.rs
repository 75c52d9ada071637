//! Unstructured partition API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, error};

use crate::domain::{DomainError, Element, ParsingGateway, PartitionRequest};

pub const DEFAULT_UNSTRUCTURED_API_URL: &str = "https://api.unstructuredapp.io";
const PARTITION_PATH: &str = "/general/v0/general";
const API_KEY_HEADER: &str = "unstructured-api-key";

#[derive(Debug, Clone)]
pub struct UnstructuredConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl UnstructuredConfig {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gateway talking to the hosted (or self-hosted) Unstructured API
#[derive(Debug, Clone)]
pub struct UnstructuredGateway {
    client: reqwest::Client,
    api_key: String,
    partition_url: String,
}

impl UnstructuredGateway {
    pub fn new(config: UnstructuredConfig) -> Result<Self, DomainError> {
        if config.api_key.trim().is_empty() || config.api_url.trim().is_empty() {
            return Err(DomainError::configuration(
                "Missing Unstructured API configuration",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            partition_url: partition_url(&config.api_url),
        })
    }

    pub fn partition_url(&self) -> &str {
        &self.partition_url
    }
}

/// Accepts either the service root or the full partition endpoint
fn partition_url(api_url: &str) -> String {
    let base = api_url.trim().trim_end_matches('/');

    if base.ends_with(PARTITION_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, PARTITION_PATH)
    }
}

/// The service answers with a JSON array, occasionally wrapped in a string
fn parse_elements(body: Value) -> Result<Vec<Element>, DomainError> {
    let body = match body {
        Value::String(raw) => serde_json::from_str(&raw)
            .map_err(|_| DomainError::gateway("Invalid response format from API"))?,
        other => other,
    };

    if !body.is_array() {
        return Err(DomainError::gateway("Unexpected response format from API"));
    }

    let elements: Vec<Element> = serde_json::from_value(body)
        .map_err(|e| DomainError::gateway(format!("Invalid element in API response: {}", e)))?;

    if elements.is_empty() {
        return Err(DomainError::empty_result("No elements found in the response"));
    }

    Ok(elements)
}

#[async_trait]
impl ParsingGateway for UnstructuredGateway {
    async fn partition(&self, request: PartitionRequest) -> Result<Vec<Element>, DomainError> {
        debug!(
            filename = %request.filename,
            size = request.content.len(),
            strategy = %request.strategy,
            "Sending document to Unstructured"
        );

        let file = Part::bytes(request.content.to_vec()).file_name(request.filename.clone());
        let form = Form::new()
            .part("files", file)
            .text("strategy", request.strategy.as_api_str());

        let response = self
            .client
            .post(&self.partition_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::gateway(format!("Request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();

            error!(
                status = status.as_u16(),
                filename = %request.filename,
                "Unstructured API returned an error"
            );

            return Err(DomainError::gateway_status(
                format!("Parsing service returned HTTP {}", status),
                status.as_u16(),
                details,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| DomainError::gateway("Invalid response format from API"))?;

        parse_elements(body)
    }

    fn name(&self) -> &'static str {
        "unstructured"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::{ElementKind, Strategy};

    fn gateway(server: &MockServer) -> UnstructuredGateway {
        UnstructuredGateway::new(UnstructuredConfig::new("test-key", server.uri())).unwrap()
    }

    fn request() -> PartitionRequest {
        PartitionRequest::new(b"%PDF-1.7".to_vec(), "doc.pdf")
    }

    #[test]
    fn test_missing_configuration() {
        let result = UnstructuredGateway::new(UnstructuredConfig::new("", "http://x"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_partition_url_variants() {
        assert_eq!(
            partition_url("https://api.example.com/"),
            "https://api.example.com/general/v0/general"
        );
        assert_eq!(
            partition_url("https://api.example.com/general/v0/general"),
            "https://api.example.com/general/v0/general"
        );
    }

    #[tokio::test]
    async fn test_partition_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/general/v0/general"))
            .and(header("unstructured-api-key", "test-key"))
            .and(body_string_contains("doc.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "Title", "element_id": "1", "text": "Intro", "metadata": {"page_number": 1}},
                {"type": "NarrativeText", "element_id": "2", "text": "Body", "metadata": {"page_number": 1}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let elements = gateway(&server).partition(request()).await.unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].kind, ElementKind::Title);
        assert_eq!(elements[1].text.as_deref(), Some("Body"));
    }

    #[tokio::test]
    async fn test_partition_sends_hi_res_strategy() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("hi_res"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "Image", "element_id": "1"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let elements = gateway(&server)
            .partition(request().with_strategy(Strategy::HighRes))
            .await
            .unwrap();

        assert_eq!(elements[0].kind, ElementKind::Image);
    }

    #[tokio::test]
    async fn test_partition_http_error_keeps_status_and_details() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad strategy"))
            .mount(&server)
            .await;

        let err = gateway(&server).partition(request()).await.unwrap_err();

        match err {
            DomainError::Gateway {
                status, details, ..
            } => {
                assert_eq!(status, Some(422));
                assert_eq!(details.as_deref(), Some("bad strategy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_partition_empty_array() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = gateway(&server).partition(request()).await.unwrap_err();

        assert!(matches!(err, DomainError::EmptyResult { .. }));
        assert_eq!(err.to_string(), "No elements found in the response");
    }

    #[test]
    fn test_parse_elements_unwraps_string_payload() {
        let body = Value::String(r#"[{"type": "Footer", "element_id": "f"}]"#.to_string());

        let elements = parse_elements(body).unwrap();
        assert_eq!(elements[0].kind, ElementKind::Footer);
    }

    #[test]
    fn test_parse_elements_rejects_objects() {
        let err = parse_elements(json!({"detail": "nope"})).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected response format from API");
    }

    #[test]
    fn test_parse_elements_rejects_garbage_string() {
        let err = parse_elements(Value::String("not json".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid response format from API");
    }
}
