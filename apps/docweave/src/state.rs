use std::sync::Arc;

use crate::errors::AppError;
use crate::pipeline::PipelineContext;
use crate::storage::{BlobSource, DocumentStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineContext,
    /// Present only when S3 is configured.
    pub blobs: Option<BlobSource>,
}

impl AppState {
    pub fn store(&self) -> Result<&Arc<dyn DocumentStore>, AppError> {
        self.pipeline
            .store
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("document storage is not configured".to_string()))
    }

    pub fn blobs(&self) -> Result<&BlobSource, AppError> {
        self.blobs
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("blob storage is not configured".to_string()))
    }
}
