//! Stateless parse endpoint handler

use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ParseResponse, read_upload_form};
use crate::domain::upload::EMPTY_RESULT_MESSAGE;
use crate::domain::{DomainError, PartitionRequest, Strategy, organize, render_document};

/// POST /api/parse
pub async fn parse_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let form = read_upload_form(multipart, state.policy()).await?;

    if let Err(e) = state.policy().validate(&form.file) {
        warn!(
            request_id = %request_id,
            filename = %form.file.filename,
            content_type = %form.file.content_type,
            error = %e,
            "Rejected parse request"
        );
        return Err(e.into());
    }

    let strategy = Strategy::from_high_res(form.high_res);

    info!(
        request_id = %request_id,
        filename = %form.file.filename,
        size = form.file.size(),
        strategy = %strategy,
        gateway = state.gateway.name(),
        "Processing parse request"
    );

    let request =
        PartitionRequest::new(form.file.content, form.file.filename).with_strategy(strategy);
    let elements = state.gateway.partition(request).await?;
    let element_count = elements.len();

    let chunks = organize(elements);

    if chunks.is_empty() {
        return Err(DomainError::empty_result(EMPTY_RESULT_MESSAGE).into());
    }

    debug!(
        request_id = %request_id,
        elements = element_count,
        chunks = chunks.len(),
        "Organized parse result"
    );

    let rendered = render_document(&chunks, form.raw)?;

    Ok(Json(ParseResponse {
        request_id,
        chunks,
        rendered,
    }))
}
