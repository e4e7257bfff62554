//! Table interpretation: title inference, selection decoding and grid rendering.
//!
//! Everything here is a pure function of its inputs. CPU cost is proportional to the
//! number of cells, so handlers call it inline.

pub mod grid;
pub mod selections;
pub mod title;

use serde::{Deserialize, Serialize};

use crate::layout::document::LayoutDocument;
use crate::layout::table::Table;

pub use grid::{render_grid, table_grid};
pub use selections::{decode_selections, SelectionPolicy, SkillSelection};
pub use title::infer_title;

/// Derived view of a table. Never empty-titled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_title: String,
    pub selections: Vec<SkillSelection>,
}

/// A summary plus its rendered grid, addressed by page and position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub page_number: u32,
    pub table_index: usize,
    #[serde(flatten)]
    pub summary: TableSummary,
    pub grid: String,
}

pub fn summarize_table(table: &Table, page_lines: &[String], policy: SelectionPolicy) -> TableSummary {
    TableSummary {
        table_title: infer_title(table, page_lines),
        selections: decode_selections(table, policy),
    }
}

/// Interprets every table of every page, in page order then table order.
pub fn interpret_document(document: &LayoutDocument, policy: SelectionPolicy) -> Vec<TableReport> {
    document
        .pages()
        .iter()
        .flat_map(|page| {
            page.tables.iter().enumerate().map(move |(table_index, table)| {
                let summary = summarize_table(table, &page.lines, policy);
                let grid = render_grid(&summary.table_title, &table_grid(table));
                TableReport {
                    page_number: page.page_number,
                    table_index,
                    summary,
                    grid,
                }
            })
        })
        .collect()
}
