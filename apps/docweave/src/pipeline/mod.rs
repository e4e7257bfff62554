//! End-to-end processing of one input document.
//!
//! Only document analysis is fatal for a PDF. Vision, LLM and storage failures are
//! recorded on the document and processing carries on.

pub mod content;
pub mod files;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{DocumentAnalyzer, ImageAnalyzer};
use crate::cues::extract_cues;
use crate::display::{display_final_output, display_llm_output, display_vision_output, log_processing_step};
use crate::errors::AppError;
use crate::interpret::{interpret_document, SelectionPolicy};
use crate::layout::{FileType, LayoutBuilder, LayoutDocument, StorageInfo};
use crate::llm_client::ContentAnalyzer;
use crate::storage::{prepare_document_for_storage, DocumentStore};

pub use content::prepare_content_for_llm;
pub use files::{calculate_processing_time, detect_file_type, sanitize_filename};

/// Collaborators shared by every request. Built once in `main`.
#[derive(Clone)]
pub struct PipelineContext {
    pub documents: Arc<dyn DocumentAnalyzer>,
    pub vision: Option<Arc<dyn ImageAnalyzer>>,
    pub llm: Option<Arc<dyn ContentAnalyzer>>,
    pub store: Option<Arc<dyn DocumentStore>>,
    pub selection_policy: SelectionPolicy,
    pub persist_table_summaries: bool,
}

pub struct DocumentInput {
    pub filename: String,
    pub bytes: Bytes,
}

pub async fn process_document(
    ctx: &PipelineContext,
    input: DocumentInput,
) -> Result<LayoutDocument, AppError> {
    let start = Utc::now();
    log_processing_step(
        "Starting Document Analysis",
        Some(&format!("Processing file: {}", input.filename)),
    );

    if input.bytes.is_empty() {
        return Err(AppError::Validation(format!("'{}' is empty", input.filename)));
    }

    let filename = sanitize_filename(&input.filename);
    let file_type = detect_file_type(&filename)?;

    let mut document = match file_type {
        FileType::Pdf => analyze_pdf(ctx, &filename, input.bytes).await?,
        FileType::Image => analyze_image(ctx, &filename, input.bytes).await?,
    };

    if let Some(llm) = &ctx.llm {
        log_processing_step("LLM Semantic Analysis", Some("Analyzing content with Azure OpenAI"));
        let content = prepare_content_for_llm(&document);
        match llm.analyze(&content).await {
            Ok(analysis) => {
                display_llm_output(&analysis);
                document.attach_llm_analysis(analysis);
            }
            Err(e) => {
                warn!("LLM analysis failed (continuing without it): {e}");
                document.record_llm_error(e.to_string());
            }
        }
    }

    if ctx.persist_table_summaries {
        let reports = interpret_document(&document, ctx.selection_policy);
        info!(tables = reports.len(), "Interpreted tables");
        document.attach_table_summaries(reports);
    }

    log_processing_step(
        "Final Output Generation",
        Some("Displaying complete processing results"),
    );
    display_final_output(&document);

    if let Some(store) = &ctx.store {
        log_processing_step("Data Storage", Some("Storing results"));
        let record = prepare_document_for_storage(&document, Some(&filename));
        match store.store(record).await {
            Ok(stored) => document.attach_storage_info(StorageInfo {
                stored: true,
                document_id: stored.id,
                timestamp: stored.timestamp,
            }),
            Err(e) => {
                warn!("Storage failed (continuing without it): {e}");
                document.record_storage_error(e.to_string());
            }
        }
    }

    let timing = calculate_processing_time(start, Utc::now());
    log_processing_step(
        "Processing Complete",
        Some(&format!("Total time: {}", timing.duration_formatted)),
    );
    document.set_processing_time(timing);

    info!(id = %document.id(), "Successfully processed {filename}");
    Ok(document)
}

/// Layout from document analysis, then one vision call per page whose cues are merged
/// into that page's tables.
async fn analyze_pdf(
    ctx: &PipelineContext,
    filename: &str,
    bytes: Bytes,
) -> Result<LayoutDocument, AppError> {
    log_processing_step(
        "Document Intelligence Analysis",
        Some("Analyzing document with Azure Document Intelligence"),
    );
    let result = ctx.documents.analyze(bytes.clone()).await?;
    let mut builder = LayoutBuilder::from_analysis(&result, filename);
    log_processing_step(
        "Document Intelligence Complete",
        Some(&format!("Extracted {} pages", result.pages.len())),
    );

    let mut vision_errors = Vec::new();
    match &ctx.vision {
        None => warn!("Vision API not configured; pages get no visual cues"),
        Some(vision) => {
            log_processing_step("AI Vision Analysis", Some("Processing with Azure AI Vision"));
            for page_number in builder.page_numbers() {
                let request_id = format!("{}-p{page_number}", builder.id());
                let cues = match vision.analyze(bytes.clone(), &request_id).await {
                    Ok(analysis) => {
                        display_vision_output(&analysis, &format!("- Page {page_number}"));
                        extract_cues(Some(&analysis), page_number)
                    }
                    Err(e) => {
                        warn!(page = page_number, "Vision analysis failed (continuing without it): {e}");
                        vision_errors.push(format!("page {page_number}: {e}"));
                        extract_cues(None, page_number)
                    }
                };
                info!(page = page_number, cues = cues.len(), "Merging visual cues");
                builder.merge_cues(page_number, cues);
            }
        }
    }

    let mut document = builder.build();
    if !vision_errors.is_empty() {
        document.record_vision_error(vision_errors.join("; "));
    }
    Ok(document)
}

/// Images skip document analysis: the vision read lines become the only page.
async fn analyze_image(
    ctx: &PipelineContext,
    filename: &str,
    bytes: Bytes,
) -> Result<LayoutDocument, AppError> {
    let vision = ctx.vision.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("image inputs require the vision service".to_string())
    })?;

    log_processing_step("AI Vision Analysis", Some("Processing image with Azure AI Vision"));
    let request_id = Uuid::new_v4().to_string();
    let analysis = vision.analyze(bytes, &request_id).await?;
    display_vision_output(&analysis, "- Image Input");

    let mut builder = LayoutBuilder::from_vision(&analysis, filename);
    builder.merge_cues(1, extract_cues(Some(&analysis), 1));
    Ok(builder.build())
}
