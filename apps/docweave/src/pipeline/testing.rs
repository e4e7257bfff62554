//! Canned collaborators for pipeline and handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::analysis::document_intelligence::{
    AnalyzeResult, AnalyzedCell, AnalyzedLine, AnalyzedPage, AnalyzedTable, BoundingRegion,
};
use crate::analysis::vision::{DetectedLine, DetectedObject, VisionAnalysis};
use crate::analysis::{AnalysisError, DocumentAnalyzer, ImageAnalyzer};
use crate::cues::BoundingBox;
use crate::interpret::selections::SELECTED_MARKER;
use crate::interpret::SelectionPolicy;
use crate::llm_client::{ContentAnalyzer, LlmError};
use crate::pipeline::PipelineContext;
use crate::storage::memory::InMemoryDocumentStore;

pub struct StubDocumentAnalyzer {
    pub result: Option<AnalyzeResult>,
}

#[async_trait]
impl DocumentAnalyzer for StubDocumentAnalyzer {
    async fn analyze(&self, _document: Bytes) -> Result<AnalyzeResult, AnalysisError> {
        self.result
            .clone()
            .ok_or_else(|| AnalysisError::OperationFailed("stubbed failure".to_string()))
    }
}

/// Returns `analysis` for every call and records the request ids it saw.
pub struct StubImageAnalyzer {
    pub analysis: Option<VisionAnalysis>,
    pub request_ids: Mutex<Vec<String>>,
}

impl StubImageAnalyzer {
    pub fn returning(analysis: VisionAnalysis) -> Self {
        Self {
            analysis: Some(analysis),
            request_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            analysis: None,
            request_ids: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageAnalyzer for StubImageAnalyzer {
    async fn analyze(&self, _image: Bytes, request_id: &str) -> Result<VisionAnalysis, AnalysisError> {
        self.request_ids.lock().await.push(request_id.to_string());
        self.analysis.clone().ok_or(AnalysisError::Api {
            status: 500,
            message: "vision unavailable".to_string(),
        })
    }
}

pub struct StubContentAnalyzer {
    pub fail: bool,
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl ContentAnalyzer for StubContentAnalyzer {
    async fn analyze(&self, content: &str) -> Result<Value, LlmError> {
        self.seen.lock().await.push(content.to_string());
        if self.fail {
            return Err(LlmError::EmptyContent);
        }
        Ok(json!({"document_type": "skills form"}))
    }
}

fn cell(row: u32, column: u32, content: &str) -> AnalyzedCell {
    AnalyzedCell {
        row_index: row,
        column_index: column,
        content: content.to_string(),
        ..Default::default()
    }
}

/// One page, one 3x8 skills table captioned "Skills": Python marks slot 2, Rust marks slots 0 and 5.
pub fn skills_form() -> AnalyzeResult {
    AnalyzeResult {
        pages: vec![AnalyzedPage {
            page_number: 1,
            lines: vec![
                AnalyzedLine { content: "Candidate Profile".into() },
                AnalyzedLine { content: "Skills".into() },
                AnalyzedLine { content: "Skill".into() },
            ],
            ..Default::default()
        }],
        tables: vec![AnalyzedTable {
            row_count: 3,
            column_count: 8,
            bounding_regions: vec![BoundingRegion { page_number: 1 }],
            cells: vec![
                cell(0, 0, "Skill"),
                cell(1, 0, "Python"),
                cell(1, 4, SELECTED_MARKER),
                cell(2, 0, "Rust"),
                cell(2, 2, SELECTED_MARKER),
                cell(2, 7, SELECTED_MARKER),
            ],
        }],
        ..Default::default()
    }
}

/// A vision result with one checkbox-shaped object and one handwritten signature.
pub fn vision_with_cues() -> VisionAnalysis {
    VisionAnalysis {
        objects: vec![DetectedObject {
            rectangle: BoundingBox::new(10.0, 10.0, 20.0, 20.0),
            confidence: 0.9,
            tags: vec![],
        }],
        text_lines: vec![DetectedLine {
            content: "Signed: A. Lovelace".into(),
            is_handwritten: true,
            confidence: 0.8,
            bounding_polygon: vec![0.0, 0.0, 100.0, 0.0, 100.0, 20.0, 0.0, 20.0],
            language: None,
        }],
        api_version: Some("2024-04-01".into()),
        ..Default::default()
    }
}

pub struct Harness {
    pub context: PipelineContext,
    pub vision: Arc<StubImageAnalyzer>,
    pub llm: Arc<StubContentAnalyzer>,
    pub store: Arc<InMemoryDocumentStore>,
}

/// A fully wired context around `result` and `vision`.
pub fn harness(result: Option<AnalyzeResult>, vision: StubImageAnalyzer) -> Harness {
    let vision = Arc::new(vision);
    let llm = Arc::new(StubContentAnalyzer {
        fail: false,
        seen: Mutex::new(Vec::new()),
    });
    let store = Arc::new(InMemoryDocumentStore::default());

    let context = PipelineContext {
        documents: Arc::new(StubDocumentAnalyzer { result }),
        vision: Some(vision.clone()),
        llm: Some(llm.clone()),
        store: Some(store.clone()),
        selection_policy: SelectionPolicy::LastMatch,
        persist_table_summaries: false,
    };

    Harness {
        context,
        vision,
        llm,
        store,
    }
}
