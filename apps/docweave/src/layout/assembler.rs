//! Layout assembly: the boundary where upstream analysis results become a
//! `LayoutDocument`.
//!
//! `LayoutBuilder` owns the pages while cues are still being merged in; `build` freezes
//! them. Malformed tables are dropped here with a warning so that nothing downstream
//! sees a cell outside its table.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::document_intelligence::{AnalyzeResult, AnalyzedTable};
use crate::analysis::vision::VisionAnalysis;
use crate::cues::Cue;
use crate::layout::document::{
    DocumentMetadata, FileType, LayoutDocument, Page, SelectionMark, SelectionState, VisionSummary,
};
use crate::layout::merger::merge_cues;
use crate::layout::table::{Cell, LayoutError, Table};

pub struct LayoutBuilder {
    id: Uuid,
    source: String,
    file_type: FileType,
    pages: Vec<Page>,
    handwritten_styles: usize,
    vision_summary: Option<VisionSummary>,
}

impl LayoutBuilder {
    /// Builds the skeletal layout of a document-analysis result. Each table is placed on
    /// every page one of its bounding regions points at.
    pub fn from_analysis(result: &AnalyzeResult, source: &str) -> Self {
        info!("Extracting layout data from analysis result.");

        let handwritten_styles = result
            .styles
            .iter()
            .filter(|s| s.is_handwritten.unwrap_or(false))
            .count();
        if handwritten_styles > 0 {
            info!("Document contains handwritten content ({handwritten_styles} style(s))");
        }

        let pages = result
            .pages
            .iter()
            .map(|analyzed| {
                let page_number = analyzed.page_number;
                debug!("--- Page {page_number} ---");

                let mut page = Page::new(page_number);
                page.lines = analyzed.lines.iter().map(|l| l.content.clone()).collect();
                page.selection_marks = analyzed
                    .selection_marks
                    .iter()
                    .map(|mark| SelectionMark {
                        state: SelectionState::from_service(&mark.state),
                        confidence: mark.confidence,
                    })
                    .collect();

                for (idx, line) in page.lines.iter().enumerate() {
                    debug!("Line {idx}: '{line}'");
                }

                page.tables = result
                    .tables
                    .iter()
                    .filter(|t| t.is_on_page(page_number))
                    .enumerate()
                    .filter_map(|(table_index, analyzed_table)| {
                        match convert_table(analyzed_table) {
                            Ok(table) => {
                                info!(
                                    "Table {table_index}: {} rows, {} columns",
                                    table.row_count(),
                                    table.column_count()
                                );
                                Some(table)
                            }
                            Err(e) => {
                                warn!(page = page_number, table = table_index, "Skipping malformed table: {e}");
                                None
                            }
                        }
                    })
                    .collect();

                page
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            file_type: FileType::Pdf,
            pages,
            handwritten_styles,
            vision_summary: None,
        }
    }

    /// Builds a single-page layout for an image input from the vision read lines.
    pub fn from_vision(analysis: &VisionAnalysis, source: &str) -> Self {
        let mut page = Page::new(1);
        page.lines = analysis.line_texts();

        let vision_summary = VisionSummary {
            caption: analysis
                .caption
                .as_ref()
                .map(|c| c.text.clone())
                .unwrap_or_default(),
            confidence: analysis.caption.as_ref().map(|c| c.confidence).unwrap_or(0.0),
            api_version: analysis
                .api_version
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        };

        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            file_type: FileType::Image,
            pages: vec![page],
            handwritten_styles: analysis.text_lines.iter().filter(|l| l.is_handwritten).count(),
            vision_summary: Some(vision_summary),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.page_number).collect()
    }

    /// Merges one page's cues into that page's tables and keeps the cues on the page.
    /// Cues for a page number the document does not have are dropped with a warning.
    pub fn merge_cues(&mut self, page_number: u32, cues: Vec<Cue>) {
        let Some(page) = self.pages.iter_mut().find(|p| p.page_number == page_number) else {
            warn!(page = page_number, count = cues.len(), "Dropping cues for unknown page");
            return;
        };

        page.tables = std::mem::take(&mut page.tables)
            .into_iter()
            .map(|table| merge_cues(table, &cues, page_number))
            .collect();
        page.visual_cues.extend(cues);
    }

    pub fn build(self) -> LayoutDocument {
        let metadata = DocumentMetadata {
            processed_at: Utc::now(),
            source: self.source,
            file_type: self.file_type,
            page_count: self.pages.len(),
            table_count: self.pages.iter().map(|p| p.tables.len()).sum(),
            cue_count: self.pages.iter().map(|p| p.visual_cues.len()).sum(),
            handwritten_styles: self.handwritten_styles,
        };

        let mut document = LayoutDocument::new(self.id, metadata, self.pages);
        if let Some(summary) = self.vision_summary {
            document.attach_vision_summary(summary);
        }
        document
    }
}

fn convert_table(analyzed: &AnalyzedTable) -> Result<Table, LayoutError> {
    let cells = analyzed
        .cells
        .iter()
        .map(|c| {
            Cell::new(c.row_index, c.column_index, c.content.clone())
                .with_spans(c.row_span.unwrap_or(1), c.column_span.unwrap_or(1))
        })
        .collect();
    Table::new(analyzed.row_count, analyzed.column_count, cells)
}
