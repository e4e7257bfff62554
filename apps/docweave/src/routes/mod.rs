pub mod documents;
pub mod health;
pub mod tables;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document processing
        .route(
            "/api/v1/documents",
            get(documents::handle_query_documents).post(documents::handle_upload),
        )
        .route("/api/v1/documents/blob", post(documents::handle_process_blob))
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get_document).patch(documents::handle_update_document),
        )
        .route(
            "/api/v1/documents/:id/tables",
            get(documents::handle_document_tables),
        )
        // Table interpretation
        .route("/api/v1/tables/summarize", post(tables::handle_summarize))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
