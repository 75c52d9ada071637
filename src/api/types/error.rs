//! JSON error envelope returned by every endpoint

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    PayloadTooLargeError,
    RateLimitError,
    EmptyResultError,
    GatewayError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::PayloadTooLargeError => write!(f, "payload_too_large_error"),
            Self::RateLimitError => write!(f, "rate_limit_error"),
            Self::EmptyResultError => write!(f, "empty_result_error"),
            Self::GatewayError => write!(f, "gateway_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    /// Status code reported by the parsing service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    upstream_status: None,
                    details: None,
                },
            },
            retry_after_secs: None,
        }
    }

    pub fn with_upstream(mut self, status: Option<u16>, details: Option<String>) -> Self {
        self.response.error.upstream_status = status;
        self.response.error.details = details;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorType::PayloadTooLargeError,
            message,
        )
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: u64) -> Self {
        let mut err = Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            ApiErrorType::RateLimitError,
            message,
        );
        err.retry_after_secs = Some(retry_after_secs);
        err
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            message,
        )
    }

    pub fn message(&self) -> &str {
        &self.response.error.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = self.retry_after_secs;
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Gateway {
                message,
                status,
                details,
            } => Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::GatewayError, message)
                .with_upstream(status, details),
            DomainError::EmptyResult { message } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorType::EmptyResultError,
                message,
            ),
            DomainError::RateLimited {
                message,
                retry_after_secs,
            } => Self::rate_limited(message, retry_after_secs),
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Unexpected { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
