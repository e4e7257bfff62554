//! Tables and cells as extracted by document analysis.
//!
//! A `Table` owns its cells keyed by `(row_index, column_index)`. The key is unique and
//! always inside the declared bounds; both are checked once in [`Table::new`] (and on
//! deserialization) so the interpretation code never has to re-validate them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cues::CueType;

/// Invalid-data conditions for table structures. Raised instead of fabricating data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("cell ({row}, {column}) lies outside a {row_count}x{column_count} table")]
    CellOutOfBounds {
        row: u32,
        column: u32,
        row_count: u32,
        column_count: u32,
    },

    #[error("duplicate cell at ({row}, {column})")]
    DuplicateCell { row: u32, column: u32 },

    #[error("cell ({row}, {column}) has a zero span")]
    ZeroSpan { row: u32, column: u32 },

    #[error("a {row_count}x{column_count} table exceeds {max} grid slots", max = MAX_TABLE_SLOTS)]
    TooLarge { row_count: u32, column_count: u32 },
}

/// Upper bound on `row_count * column_count`. Tables are laid out as dense grids.
pub const MAX_TABLE_SLOTS: u32 = 1_000_000;

fn default_span() -> u32 {
    1
}

/// A single table cell. A merged cell occupies its primary key only; `row_span` and
/// `column_span` describe the extent it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row_index: u32,
    pub column_index: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_span")]
    pub row_span: u32,
    #[serde(default = "default_span")]
    pub column_span: u32,
    /// Set by the cue merger. Null when no cue was associated with this cell.
    #[serde(default)]
    pub visual_cue: Option<CueType>,
}

impl Cell {
    pub fn new(row_index: u32, column_index: u32, content: impl Into<String>) -> Self {
        Self {
            row_index,
            column_index,
            content: content.into(),
            row_span: 1,
            column_span: 1,
            visual_cue: None,
        }
    }

    pub fn with_spans(mut self, row_span: u32, column_span: u32) -> Self {
        self.row_span = row_span;
        self.column_span = column_span;
        self
    }

    pub fn key(&self) -> (u32, u32) {
        (self.row_index, self.column_index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct Table {
    row_count: u32,
    column_count: u32,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct TableRepr {
    row_count: u32,
    column_count: u32,
    #[serde(default)]
    cells: Vec<Cell>,
}

impl TryFrom<TableRepr> for Table {
    type Error = LayoutError;

    fn try_from(repr: TableRepr) -> Result<Self, Self::Error> {
        Table::new(repr.row_count, repr.column_count, repr.cells)
    }
}

impl Table {
    /// Builds a table, rejecting oversized dimensions, cells outside the declared bounds,
    /// zero spans and duplicate `(row, column)` keys. Cells are stored in row-major order.
    pub fn new(row_count: u32, column_count: u32, mut cells: Vec<Cell>) -> Result<Self, LayoutError> {
        let fits = row_count
            .checked_mul(column_count)
            .is_some_and(|slots| slots <= MAX_TABLE_SLOTS);
        if !fits {
            return Err(LayoutError::TooLarge {
                row_count,
                column_count,
            });
        }

        let mut seen = HashSet::with_capacity(cells.len());

        for cell in &cells {
            if cell.row_index >= row_count || cell.column_index >= column_count {
                return Err(LayoutError::CellOutOfBounds {
                    row: cell.row_index,
                    column: cell.column_index,
                    row_count,
                    column_count,
                });
            }
            if cell.row_span == 0 || cell.column_span == 0 {
                return Err(LayoutError::ZeroSpan {
                    row: cell.row_index,
                    column: cell.column_index,
                });
            }
            if !seen.insert(cell.key()) {
                return Err(LayoutError::DuplicateCell {
                    row: cell.row_index,
                    column: cell.column_index,
                });
            }
        }

        cells.sort_by_key(Cell::key);

        Ok(Self {
            row_count,
            column_count,
            cells,
        })
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row_index: u32, column_index: u32) -> Option<&Cell> {
        self.cells
            .binary_search_by_key(&(row_index, column_index), Cell::key)
            .ok()
            .map(|idx| &self.cells[idx])
    }

    /// Cells of one row, ordered by column.
    pub fn row(&self, row_index: u32) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.row_index == row_index)
    }

    /// Distinct row indices that hold at least one cell, ascending.
    pub fn row_indices(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self.cells.iter().map(|c| c.row_index).collect();
        rows.dedup();
        rows
    }

    /// The smallest row index holding a cell.
    pub fn first_row_index(&self) -> Option<u32> {
        self.cells.first().map(|c| c.row_index)
    }

    /// Returns the table with every cell's `visual_cue` replaced by `assign(cell)`.
    /// Keys and spans are untouched, so the table invariants carry over.
    pub fn with_visual_cues(mut self, mut assign: impl FnMut(&Cell) -> Option<CueType>) -> Self {
        for cell in &mut self.cells {
            cell.visual_cue = assign(cell);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_cells_row_major() {
        let table = Table::new(
            2,
            2,
            vec![
                Cell::new(1, 1, "D"),
                Cell::new(0, 1, "B"),
                Cell::new(1, 0, "C"),
                Cell::new(0, 0, "A"),
            ],
        )
        .unwrap();

        let contents: Vec<&str> = table.cells().iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B", "C", "D"]);
        assert_eq!(table.cell(1, 0).map(|c| c.content.as_str()), Some("C"));
        assert!(table.cell(2, 0).is_none());
    }

    #[test]
    fn test_new_rejects_out_of_bounds_cell() {
        let err = Table::new(1, 2, vec![Cell::new(0, 2, "x")]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::CellOutOfBounds {
                row: 0,
                column: 2,
                row_count: 1,
                column_count: 2
            }
        );
    }

    #[test]
    fn test_new_rejects_duplicate_key() {
        let err = Table::new(1, 1, vec![Cell::new(0, 0, "a"), Cell::new(0, 0, "b")]).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateCell { row: 0, column: 0 });
    }

    #[test]
    fn test_new_rejects_zero_span() {
        let err = Table::new(1, 1, vec![Cell::new(0, 0, "a").with_spans(0, 1)]).unwrap_err();
        assert_eq!(err, LayoutError::ZeroSpan { row: 0, column: 0 });
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        let err = Table::new(4_000_000_000, 4_000_000_000, vec![]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TooLarge {
                row_count: 4_000_000_000,
                column_count: 4_000_000_000
            }
        );
        assert!(Table::new(MAX_TABLE_SLOTS + 1, 1, vec![]).is_err());
        assert!(Table::new(1000, 1000, vec![]).is_ok());

        let json = r#"{"row_count": 4000000000, "column_count": 4000000000, "cells": []}"#;
        assert!(serde_json::from_str::<Table>(json).is_err());
    }

    #[test]
    fn test_deserialize_validates_and_defaults_spans() {
        let json = r#"{"row_count": 1, "column_count": 2,
            "cells": [{"row_index": 0, "column_index": 1, "content": "x"}]}"#;
        let table: Table = serde_json::from_str(json).unwrap();
        let cell = table.cell(0, 1).unwrap();
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.column_span, 1);
        assert_eq!(cell.visual_cue, None);

        let bad = r#"{"row_count": 1, "column_count": 1,
            "cells": [{"row_index": 3, "column_index": 0}]}"#;
        assert!(serde_json::from_str::<Table>(bad).is_err());
    }

    #[test]
    fn test_row_indices_and_first_row() {
        let table = Table::new(
            4,
            1,
            vec![Cell::new(3, 0, "c"), Cell::new(1, 0, "a"), Cell::new(2, 0, "b")],
        )
        .unwrap();
        assert_eq!(table.row_indices(), vec![1, 2, 3]);
        assert_eq!(table.first_row_index(), Some(1));
        assert_eq!(table.row(2).count(), 1);
    }
}
