use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::storage::{merge_content, DocumentStore, StoredDocument};

/// In-memory store for pipeline and handler tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<String, StoredDocument>>,
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn store(&self, document: StoredDocument) -> Result<StoredDocument, AppError> {
        self.documents
            .lock()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn retrieve(&self, id: &str) -> Result<Option<StoredDocument>, AppError> {
        Ok(self.documents.lock().await.get(id).cloned())
    }

    async fn query_by_filename(&self, filename: &str) -> Result<Vec<StoredDocument>, AppError> {
        let mut found: Vec<StoredDocument> = self
            .documents
            .lock()
            .await
            .values()
            .filter(|d| d.original_filename == filename)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(found)
    }

    async fn update(&self, id: &str, updates: Value) -> Result<StoredDocument, AppError> {
        let mut documents = self.documents.lock().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Document {id} not found for update")))?;
        merge_content(&mut document.content, updates);
        document.last_updated = Some(Utc::now());
        Ok(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(id: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            timestamp: Utc::now(),
            original_filename: "form.pdf".to_string(),
            file_type: "pdf".to_string(),
            processing_status: "completed".to_string(),
            content: json!({"metadata": {"page_count": 1}, "pages": []}),
            serialization_issue: None,
            last_updated: None,
        }
    }

    #[tokio::test]
    async fn test_update_merges_keys_and_stamps_last_updated() {
        let store = InMemoryDocumentStore::default();
        store.store(stored("doc-1")).await.unwrap();

        let updated = store
            .update("doc-1", json!({"reviewed": true, "pages": [1]}))
            .await
            .unwrap();
        assert_eq!(updated.content["reviewed"], true);
        assert_eq!(updated.content["pages"], json!([1]));
        assert_eq!(updated.content["metadata"]["page_count"], 1);
        assert!(updated.last_updated.is_some());

        let reloaded = store.retrieve("doc-1").await.unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = InMemoryDocumentStore::default();
        let err = store.update("nope", json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
