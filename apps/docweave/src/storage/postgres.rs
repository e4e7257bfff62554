use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::document::ProcessedDocumentRow;
use crate::storage::{merge_content, DocumentStore, StoredDocument};

/// `processed_documents` table in PostgreSQL; the layout lives in a JSONB column.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn store(&self, document: StoredDocument) -> Result<StoredDocument, AppError> {
        let row = sqlx::query_as::<_, ProcessedDocumentRow>(
            r#"
            INSERT INTO processed_documents
                (id, timestamp, original_filename, file_type, processing_status,
                 content, serialization_issue)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&document.id)
        .bind(document.timestamp)
        .bind(&document.original_filename)
        .bind(&document.file_type)
        .bind(&document.processing_status)
        .bind(&document.content)
        .bind(&document.serialization_issue)
        .fetch_one(&self.pool)
        .await?;

        info!("Document stored successfully with ID: {}", row.id);
        Ok(row.into())
    }

    async fn retrieve(&self, id: &str) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query_as::<_, ProcessedDocumentRow>(
            "SELECT * FROM processed_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match &row {
            Some(_) => info!("Document retrieved successfully: {id}"),
            None => warn!("Document not found: {id}"),
        }
        Ok(row.map(Into::into))
    }

    async fn query_by_filename(&self, filename: &str) -> Result<Vec<StoredDocument>, AppError> {
        let rows = sqlx::query_as::<_, ProcessedDocumentRow>(
            "SELECT * FROM processed_documents WHERE original_filename = $1 ORDER BY timestamp DESC",
        )
        .bind(filename)
        .fetch_all(&self.pool)
        .await?;

        info!("Query returned {} documents", rows.len());
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: &str, updates: Value) -> Result<StoredDocument, AppError> {
        let existing = self
            .retrieve(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {id} not found for update")))?;

        let mut content = existing.content;
        merge_content(&mut content, updates);

        let row = sqlx::query_as::<_, ProcessedDocumentRow>(
            r#"
            UPDATE processed_documents
            SET content = $1, last_updated = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&content)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        info!("Document updated successfully: {id}");
        Ok(row.into())
    }
}
