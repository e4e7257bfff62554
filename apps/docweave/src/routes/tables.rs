use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::cues::Cue;
use crate::errors::AppError;
use crate::interpret::{render_grid, summarize_table, table_grid, SelectionPolicy, TableSummary};
use crate::layout::{merge_cues, Cell, Table};
use crate::state::AppState;

/// Table dimensions and cells as sent by the caller, validated by the handler.
#[derive(Deserialize)]
pub struct TableInput {
    pub row_count: u32,
    pub column_count: u32,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

fn default_page_number() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub table: TableInput,
    #[serde(default)]
    pub page_lines: Vec<String>,
    #[serde(default)]
    pub policy: Option<SelectionPolicy>,
    /// When present, replaces every cell's visual cue with the anchored cues here.
    #[serde(default)]
    pub cues: Option<Vec<Cue>>,
    #[serde(default = "default_page_number")]
    pub page_number: u32,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    #[serde(flatten)]
    pub summary: TableSummary,
    pub grid: String,
    pub table: Table,
}

/// POST /api/v1/tables/summarize
pub async fn handle_summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let TableInput {
        row_count,
        column_count,
        cells,
    } = req.table;
    let mut table = Table::new(row_count, column_count, cells)?;
    if let Some(cues) = &req.cues {
        table = merge_cues(table, cues, req.page_number);
    }

    let policy = req.policy.unwrap_or(state.pipeline.selection_policy);
    let summary = summarize_table(&table, &req.page_lines, policy);
    let grid = render_grid(&summary.table_title, &table_grid(&table));
    Ok(Json(SummarizeResponse {
        summary,
        grid,
        table,
    }))
}
