//! Health check endpoints for Kubernetes probes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::domain::UploadStatus;

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check reporting the wired gateway and upload state.
/// Does not call the parsing service.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let upload = state.orchestrator.state();

    let checks = vec![
        HealthCheck {
            name: "parsing_gateway".to_string(),
            status: HealthStatus::Healthy,
            message: Some(state.gateway.name().to_string()),
        },
        HealthCheck {
            name: "upload".to_string(),
            status: if upload.status == UploadStatus::Error {
                HealthStatus::Degraded
            } else {
                HealthStatus::Healthy
            },
            message: Some(upload.status.to_string()),
        },
    ];

    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness check
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
