//! Document parsing and upload endpoints

pub mod parse;
pub mod upload;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use super::middleware::rate_limit_middleware;
use super::state::AppState;

/// Create the document API router
///
/// Only the routes that reach the parsing service are rate limited.
pub fn create_documents_router(state: AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/parse", post(parse::parse_document))
        .route("/upload", post(upload::start_upload))
        .route_layer(from_fn_with_state(state, rate_limit_middleware));

    Router::new()
        .merge(limited)
        .route("/upload/state", get(upload::get_state))
        .route("/upload/events", get(upload::state_events))
        .route("/upload/document", get(upload::get_document))
        .route("/upload/toggle-raw", post(upload::toggle_raw))
        .route("/upload/reset", post(upload::reset))
}
