//! Azure AI Document Intelligence (`prebuilt-layout`) client.
//!
//! The analyze call is a long-running operation: the POST answers 202 with an
//! `Operation-Location` header that is polled until the status is terminal.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisError, DocumentAnalyzer};

const MODEL_ID: &str = "prebuilt-layout";
const API_VERSION: &str = "2023-07-31";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: u32 = 120;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// Typed mirror of `analyzeResult`. Every collection defaults to empty and every
/// optional attribute to `None`, so a sparse response still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<AnalyzedPage>,
    #[serde(default)]
    pub tables: Vec<AnalyzedTable>,
    #[serde(default)]
    pub styles: Vec<DocumentStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedPage {
    pub page_number: u32,
    #[serde(default)]
    pub lines: Vec<AnalyzedLine>,
    #[serde(default)]
    pub selection_marks: Vec<AnalyzedSelectionMark>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedLine {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSelectionMark {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedTable {
    pub row_count: u32,
    pub column_count: u32,
    #[serde(default)]
    pub bounding_regions: Vec<BoundingRegion>,
    #[serde(default)]
    pub cells: Vec<AnalyzedCell>,
}

impl AnalyzedTable {
    pub fn is_on_page(&self, page_number: u32) -> bool {
        self.bounding_regions
            .iter()
            .any(|region| region.page_number == page_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedCell {
    pub row_index: u32,
    pub column_index: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub row_span: Option<u32>,
    #[serde(default)]
    pub column_span: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStyle {
    #[serde(default)]
    pub is_handwritten: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationStatus {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DocumentIntelligenceClient {
    client: Client,
    endpoint: String,
    key: String,
}

impl DocumentIntelligenceClient {
    pub fn new(endpoint: String, key: String) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{MODEL_ID}:analyze?api-version={API_VERSION}",
            self.endpoint
        )
    }

    async fn poll(&self, operation_url: &str) -> Result<AnalyzeResult, AnalysisError> {
        for attempt in 0..MAX_POLLS {
            if attempt > 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }

            let response = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()
                .await?;
            let response = ensure_success(response).await?;
            let status: OperationStatus = response.json().await?;

            match status.status.as_str() {
                "succeeded" => {
                    return status
                        .analyze_result
                        .ok_or(AnalysisError::MissingField("analyzeResult"));
                }
                "failed" => {
                    let message = status
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "no error details".to_string());
                    return Err(AnalysisError::OperationFailed(message));
                }
                other => debug!("Layout analysis status '{other}' (poll {attempt})"),
            }
        }

        Err(AnalysisError::Timeout { polls: MAX_POLLS })
    }
}

async fn ensure_success(response: Response) -> Result<Response, AnalysisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    warn!("Document Intelligence returned {status}: {message}");
    Err(AnalysisError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentAnalyzer for DocumentIntelligenceClient {
    async fn analyze(&self, document: Bytes) -> Result<AnalyzeResult, AnalysisError> {
        info!("Starting PDF layout analysis.");
        let response = self
            .client
            .post(self.analyze_url())
            .header("Content-Type", "application/octet-stream")
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .body(document)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let operation_url = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or(AnalysisError::MissingField("Operation-Location header"))?;

        info!("PDF layout analysis in progress.");
        let result = self.poll(&operation_url).await?;

        info!(
            pages = result.pages.len(),
            tables = result.tables.len(),
            styles = result.styles.len(),
            "PDF layout analysis completed."
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_result_deserializes_service_json() {
        let json = r#"{
            "apiVersion": "2023-07-31",
            "pages": [{
                "pageNumber": 1,
                "lines": [{"content": "Skill Assessment"}],
                "selectionMarks": [{"state": "selected", "confidence": 0.98}]
            }],
            "tables": [{
                "rowCount": 1, "columnCount": 2,
                "boundingRegions": [{"pageNumber": 1, "polygon": [0, 0, 1, 1]}],
                "cells": [
                    {"kind": "columnHeader", "rowIndex": 0, "columnIndex": 0, "content": "Foo", "columnSpan": 2}
                ]
            }],
            "styles": [{"isHandwritten": true, "confidence": 0.9}]
        }"#;

        let result: AnalyzeResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.pages[0].page_number, 1);
        assert_eq!(result.pages[0].lines[0].content, "Skill Assessment");
        assert_eq!(result.pages[0].selection_marks[0].state, "selected");
        assert!(result.tables[0].is_on_page(1));
        assert!(!result.tables[0].is_on_page(2));
        assert_eq!(result.tables[0].cells[0].column_span, Some(2));
        assert_eq!(result.tables[0].cells[0].row_span, None);
        assert_eq!(result.styles[0].is_handwritten, Some(true));
    }

    #[test]
    fn test_sparse_result_defaults() {
        let result: AnalyzeResult = serde_json::from_str(r#"{"pages": [{"pageNumber": 2}]}"#).unwrap();
        assert!(result.tables.is_empty());
        assert!(result.pages[0].lines.is_empty());
        assert!(result.pages[0].selection_marks.is_empty());
    }

    #[test]
    fn test_analyze_url() {
        let client =
            DocumentIntelligenceClient::new("https://di.example/".into(), "k".into()).unwrap();
        assert_eq!(
            client.analyze_url(),
            "https://di.example/formrecognizer/documentModels/prebuilt-layout:analyze?api-version=2023-07-31"
        );
    }
}
