//! The assembled layout document and the auxiliary results attached to it.
//!
//! `pages` are fixed once a `LayoutDocument` exists: the type exposes them read-only,
//! and every later pipeline stage can only fill in the auxiliary fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::cues::Cue;
use crate::interpret::TableReport;
use crate::layout::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Selected,
    Unselected,
    #[serde(other)]
    Unknown,
}

impl SelectionState {
    pub fn from_service(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "selected" => SelectionState::Selected,
            "unselected" => SelectionState::Unselected,
            _ => SelectionState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionMark {
    pub state: SelectionState,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based, as numbered by the document-analysis service.
    pub page_number: u32,
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
    pub selection_marks: Vec<SelectionMark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visual_cues: Vec<Cue>,
}

impl Page {
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            lines: Vec::new(),
            tables: Vec::new(),
            selection_marks: Vec::new(),
            visual_cues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Image,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub processed_at: DateTime<Utc>,
    /// Original filename or blob key.
    pub source: String,
    pub file_type: FileType,
    pub page_count: usize,
    pub table_count: usize,
    pub cue_count: usize,
    #[serde(default)]
    pub handwritten_styles: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Auxiliary results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionSummary {
    pub caption: String,
    pub confidence: f64,
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub stored: bool,
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTime {
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Additive results of the optional pipeline stages. A stage either fills its result
/// field or its `*_error` field, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_analysis: Option<VisionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_analysis_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_analysis_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_summaries: Option<Vec<TableReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_info: Option<StorageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<ProcessingTime>,
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    id: Uuid,
    metadata: DocumentMetadata,
    pages: Vec<Page>,
    #[serde(flatten)]
    auxiliary: AuxiliaryAnalysis,
}

impl LayoutDocument {
    /// Only the assembler creates documents.
    pub(crate) fn new(id: Uuid, metadata: DocumentMetadata, pages: Vec<Page>) -> Self {
        Self {
            id,
            metadata,
            pages,
            auxiliary: AuxiliaryAnalysis::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn auxiliary(&self) -> &AuxiliaryAnalysis {
        &self.auxiliary
    }

    pub fn attach_vision_summary(&mut self, summary: VisionSummary) {
        self.auxiliary.vision_analysis = Some(summary);
    }

    pub fn record_vision_error(&mut self, error: String) {
        self.auxiliary.vision_analysis_error = Some(error);
    }

    pub fn attach_llm_analysis(&mut self, analysis: Value) {
        self.auxiliary.llm_analysis = Some(analysis);
        self.auxiliary.llm_analysis_error = None;
    }

    pub fn record_llm_error(&mut self, error: String) {
        self.auxiliary.llm_analysis = None;
        self.auxiliary.llm_analysis_error = Some(error);
    }

    pub fn attach_table_summaries(&mut self, reports: Vec<TableReport>) {
        self.auxiliary.table_summaries = Some(reports);
    }

    pub fn attach_storage_info(&mut self, info: StorageInfo) {
        self.auxiliary.storage_info = Some(info);
        self.auxiliary.storage_error = None;
    }

    pub fn record_storage_error(&mut self, error: String) {
        self.auxiliary.storage_info = None;
        self.auxiliary.storage_error = Some(error);
    }

    pub fn set_processing_time(&mut self, timing: ProcessingTime) {
        self.auxiliary.processing_time = Some(timing);
    }
}
