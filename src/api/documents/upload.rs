//! Orchestrated upload endpoints
//!
//! A single upload lifecycle is shared by every caller of these routes, the
//! same way a single viewer shares one store.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::api::types::{ApiError, read_upload_form};
use crate::domain::{RenderedDocument, UploadState, render_document};

const STATE_EVENT: &str = "state";

/// POST /api/upload
///
/// Validation happens inline; the gateway call runs on a spawned task and
/// settles through the orchestrator.
pub async fn start_upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_upload_form(multipart, state.policy()).await {
        Ok(form) => form,
        Err(e) => {
            state.orchestrator.set_error(e.message());
            return e.into_response();
        }
    };

    let options = form.options();
    let Some(pending) = state.orchestrator.begin_upload(form.file, options) else {
        return (StatusCode::BAD_REQUEST, Json(state.orchestrator.state())).into_response();
    };

    // Snapshot before spawning so the response always shows `uploading`
    let snapshot = state.orchestrator.state();
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        let upload_id = pending.upload_id();
        let outcome = orchestrator.finish_upload(pending).await;
        debug!(upload_id, outcome = ?outcome, "Upload task finished");
    });

    (StatusCode::ACCEPTED, Json(snapshot)).into_response()
}

/// GET /api/upload/state
pub async fn get_state(State(state): State<AppState>) -> Json<UploadState> {
    Json(state.orchestrator.state())
}

/// GET /api/upload/events
///
/// Emits the current state immediately, then every change.
pub async fn state_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.orchestrator.subscribe()).map(|snapshot| {
        let event = Event::default()
            .event(STATE_EVENT)
            .json_data(&snapshot)
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to serialize upload state");
                Event::default().event(STATE_EVENT).data("{}")
            });
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/upload/document
pub async fn get_document(
    State(state): State<AppState>,
) -> Result<Json<RenderedDocument>, ApiError> {
    let snapshot = state.orchestrator.state();

    let chunks = snapshot
        .chunks
        .ok_or_else(|| ApiError::not_found("No parsed document available"))?;

    Ok(Json(render_document(&chunks, snapshot.show_raw_json)?))
}

/// POST /api/upload/toggle-raw
pub async fn toggle_raw(State(state): State<AppState>) -> Json<UploadState> {
    state.orchestrator.toggle_show_raw();
    Json(state.orchestrator.state())
}

/// POST /api/upload/reset
pub async fn reset(State(state): State<AppState>) -> Json<UploadState> {
    state.orchestrator.reset();
    Json(state.orchestrator.state())
}
