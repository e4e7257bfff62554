use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which optional collaborators are wired.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "docweave",
        "features": {
            "vision": state.pipeline.vision.is_some(),
            "llm": state.pipeline.llm.is_some(),
            "storage": state.pipeline.store.is_some(),
            "blobs": state.blobs.is_some()
        }
    }))
}
