use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::storage::StoredDocument;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessedDocumentRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_filename: String,
    pub file_type: String,
    pub processing_status: String,
    pub content: Value,
    pub serialization_issue: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<ProcessedDocumentRow> for StoredDocument {
    fn from(row: ProcessedDocumentRow) -> Self {
        StoredDocument {
            id: row.id,
            timestamp: row.timestamp,
            original_filename: row.original_filename,
            file_type: row.file_type,
            processing_status: row.processing_status,
            content: row.content,
            serialization_issue: row.serialization_issue,
            last_updated: row.last_updated,
        }
    }
}
