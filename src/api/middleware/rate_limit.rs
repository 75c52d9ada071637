//! Per-client admission control for the upload endpoints

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::DomainError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

const ANONYMOUS_CLIENT: &str = "anonymous";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Identify the caller: first `x-forwarded-for` hop, then `x-real-ip`
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identifier(request.headers());
    let decision = state.rate_limiter.allow(&client).await;

    if !decision.success {
        let retry_after = decision.retry_after_secs(state.rate_limiter.now());

        warn!(
            client = %client,
            limit = decision.limit,
            retry_after_secs = retry_after,
            "Rate limit exceeded"
        );

        let mut response =
            ApiError::from(DomainError::rate_limited(RATE_LIMIT_MESSAGE, retry_after))
                .into_response();
        insert_headers(response.headers_mut(), decision.remaining, decision.limit);
        return response;
    }

    let mut response = next.run(request).await;
    insert_headers(response.headers_mut(), decision.remaining, decision.limit);
    response
}

fn insert_headers(headers: &mut HeaderMap, remaining: u32, limit: u32) {
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
}
