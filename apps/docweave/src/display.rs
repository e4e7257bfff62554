//! Human-readable dumps of each pipeline stage, written through `tracing`.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::VisionAnalysis;
use crate::layout::LayoutDocument;

const BANNER: &str = "================================================================================";
const STEP_SEPARATOR: &str = "--------------------------------------------------";

/// Bracketed banner for one pipeline stage.
pub fn log_processing_step(step: &str, details: Option<&str>) {
    info!("{STEP_SEPARATOR}");
    info!("PROCESSING STEP: {step}");
    if let Some(details) = details {
        info!("Details: {details}");
    }
    info!("Timestamp: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{STEP_SEPARATOR}");
}

pub fn display_vision_output(analysis: &VisionAnalysis, stage: &str) {
    info!("{BANNER}");
    info!("== COMPLETE AI VISION ANALYSIS OUTPUT {stage} ==");
    info!("{BANNER}");
    match serde_json::to_string_pretty(analysis) {
        Ok(json) => info!("Full AI Vision Analysis Results:\n{json}"),
        Err(e) => {
            warn!("Could not display complete Vision analysis: {e}");
            info!("Vision Analysis (debug format): {analysis:?}");
        }
    }
    info!("{BANNER}");
}

pub fn display_llm_output(analysis: &Value) {
    info!("{BANNER}");
    info!("== COMPLETE LLM ANALYSIS OUTPUT ==");
    info!("{BANNER}");
    match serde_json::to_string_pretty(analysis) {
        Ok(json) => info!("Full LLM Analysis Results:\n{json}"),
        Err(e) => {
            warn!("Could not display complete LLM analysis: {e}");
            info!("LLM Analysis (string format): {analysis}");
        }
    }
    info!("{BANNER}");
}

/// Dumps the assembled document as JSON, or section by section if that fails.
pub fn display_final_output(document: &LayoutDocument) {
    info!("{BANNER}");
    info!("== FINAL CONCATENATED DOCUMENT OUTPUT ==");
    info!("== ALL PROCESSING RESULTS COMBINED ==");
    info!("{BANNER}");

    match render_json(document) {
        Ok(json) => {
            info!("COMPLETE FINAL OUTPUT (All AI Processing Results):");
            info!("{json}");
        }
        Err(e) => {
            warn!("Could not display complete final output as JSON: {e}");
            display_structured_fallback(document);
        }
    }

    info!("{BANNER}");
    info!("== END OF COMPLETE DOCUMENT INFORMATION ==");
    info!("{BANNER}");
}

fn render_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn display_structured_fallback(document: &LayoutDocument) {
    let metadata = document.metadata();
    info!("COMPLETE FINAL OUTPUT (Structured Display):");
    info!("Document ID: {}", document.id());
    info!("File Type: {}", metadata.file_type.as_str());
    info!("Source: {}", metadata.source);
    info!("Number of Pages: {}", document.pages().len());

    for page in document.pages() {
        info!("--- PAGE {} ---", page.page_number);
        info!("Text Lines ({}):", page.lines.len());
        for line in &page.lines {
            info!("  {line}");
        }
        info!("Tables ({}):", page.tables.len());
        for (index, table) in page.tables.iter().enumerate() {
            info!(
                "  Table {}: {} rows x {} columns",
                index + 1,
                table.row_count(),
                table.column_count()
            );
            for cell in table.cells() {
                info!("    [R{},C{}]: {}", cell.row_index, cell.column_index, cell.content);
            }
        }
        if !page.visual_cues.is_empty() {
            info!("Visual Cues ({}):", page.visual_cues.len());
            for cue in &page.visual_cues {
                info!("  {} ({:.2})", cue.cue_type, cue.confidence);
            }
        }
    }

    let auxiliary = document.auxiliary();
    if let Some(vision) = &auxiliary.vision_analysis {
        info!("--- AI VISION ANALYSIS ---");
        info!("  caption: {}", vision.caption);
        info!("  confidence: {}", vision.confidence);
        info!("  api_version: {}", vision.api_version);
    }
    if let Some(llm) = &auxiliary.llm_analysis {
        info!("--- LLM ANALYSIS ---");
        match llm.as_object() {
            Some(fields) => {
                for (key, value) in fields {
                    info!("  {key}: {value}");
                }
            }
            None => info!("  {llm}"),
        }
    }
}
