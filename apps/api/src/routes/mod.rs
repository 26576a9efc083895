pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the `mode` field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/extract",
            post(handlers::handle_extract_upload),
        )
        .route(
            "/api/v1/resumes/extract-text",
            post(handlers::handle_extract_text),
        )
        .route("/api/v1/ai/models", get(handlers::handle_list_models))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
