use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::interpret::{interpret_document, SelectionPolicy, TableReport};
use crate::layout::LayoutDocument;
use crate::pipeline::{process_document, DocumentInput};
use crate::state::AppState;
use crate::storage::blob::filename_from_key;
use crate::storage::StoredDocument;

const FILE_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct BlobRequest {
    pub key: String,
}

#[derive(Deserialize)]
pub struct FilenameQuery {
    pub filename: String,
}

#[derive(Deserialize)]
pub struct PolicyQuery {
    pub policy: Option<SelectionPolicy>,
}

/// POST /api/v1/documents
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LayoutDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::Validation("the 'file' field has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read '{filename}': {e}")))?;

        let document = process_document(&state.pipeline, DocumentInput { filename, bytes }).await?;
        return Ok(Json(document));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// POST /api/v1/documents/blob
pub async fn handle_process_blob(
    State(state): State<AppState>,
    Json(req): Json<BlobRequest>,
) -> Result<Json<LayoutDocument>, AppError> {
    let filename = filename_from_key(&req.key);
    if filename.is_empty() {
        return Err(AppError::Validation(format!("'{}' does not name a file", req.key)));
    }

    let bytes = state.blobs()?.fetch(&req.key).await?;
    let input = DocumentInput {
        filename: filename.to_string(),
        bytes,
    };
    Ok(Json(process_document(&state.pipeline, input).await?))
}

/// GET /api/v1/documents?filename=
pub async fn handle_query_documents(
    State(state): State<AppState>,
    Query(params): Query<FilenameQuery>,
) -> Result<Json<Vec<StoredDocument>>, AppError> {
    let documents = state.store()?.query_by_filename(&params.filename).await?;
    Ok(Json(documents))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredDocument>, AppError> {
    let document = state
        .store()?
        .retrieve(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    Ok(Json(document))
}

/// PATCH /api/v1/documents/:id
pub async fn handle_update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<Value>,
) -> Result<Json<StoredDocument>, AppError> {
    if !updates.is_object() {
        return Err(AppError::Validation(
            "updates must be a JSON object".to_string(),
        ));
    }
    let document = state.store()?.update(&id, updates).await?;
    Ok(Json(document))
}

/// GET /api/v1/documents/:id/tables
pub async fn handle_document_tables(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PolicyQuery>,
) -> Result<Json<Vec<TableReport>>, AppError> {
    let stored = state
        .store()?
        .retrieve(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;

    let document: LayoutDocument = serde_json::from_value(stored.content).map_err(|e| {
        AppError::UnprocessableEntity(format!("Document {id} has no readable layout: {e}"))
    })?;

    let policy = params.policy.unwrap_or(state.pipeline.selection_policy);
    Ok(Json(interpret_document(&document, policy)))
}
