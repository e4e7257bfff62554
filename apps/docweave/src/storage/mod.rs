//! Persistence of processed documents.

pub mod blob;
#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::layout::LayoutDocument;

pub use blob::BlobSource;
pub use postgres::PgDocumentStore;

pub const STATUS_COMPLETED: &str = "completed";

/// The storage envelope around a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_filename: String,
    pub file_type: String,
    pub processing_status: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, document: StoredDocument) -> Result<StoredDocument, AppError>;

    async fn retrieve(&self, id: &str) -> Result<Option<StoredDocument>, AppError>;

    async fn query_by_filename(&self, filename: &str) -> Result<Vec<StoredDocument>, AppError>;

    /// Merges the keys of `updates` into the stored content and stamps `last_updated`.
    async fn update(&self, id: &str, updates: Value) -> Result<StoredDocument, AppError>;
}

/// Wraps `document` for storage. If it cannot be turned into JSON, its debug form is
/// stored instead and the reason is kept in `serialization_issue`.
pub fn prepare_document_for_storage(
    document: &LayoutDocument,
    original_filename: Option<&str>,
) -> StoredDocument {
    let (content, serialization_issue) = match serde_json::to_value(document) {
        Ok(value) => (value, None),
        Err(e) => {
            warn!("Document contains non-serializable data: {e}");
            (Value::String(format!("{document:?}")), Some(e.to_string()))
        }
    };

    StoredDocument {
        id: document.id().to_string(),
        timestamp: Utc::now(),
        original_filename: original_filename
            .map(String::from)
            .unwrap_or_else(|| document.metadata().source.clone()),
        file_type: document.metadata().file_type.as_str().to_string(),
        processing_status: STATUS_COMPLETED.to_string(),
        content,
        serialization_issue,
        last_updated: None,
    }
}

/// Shallow merge of object keys; a non-object `updates` replaces the content outright.
pub fn merge_content(content: &mut Value, updates: Value) {
    match (content.as_object_mut(), updates) {
        (Some(existing), Value::Object(changes)) => {
            for (key, value) in changes {
                existing.insert(key, value);
            }
        }
        (_, other) => *content = other,
    }
}
