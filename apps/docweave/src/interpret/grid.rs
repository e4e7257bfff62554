//! Fixed-width text rendering of a table.

use crate::layout::table::Table;

pub const EMPTY_TABLE: &str = "(Empty table)";

/// Lays `table` out as a dense `row_count x column_count` grid. Each cell sits at its
/// primary key only; slots covered by a span (or missing from the source) stay `None`.
pub fn table_grid(table: &Table) -> Vec<Vec<Option<String>>> {
    let mut grid = vec![vec![None; table.column_count() as usize]; table.row_count() as usize];
    for cell in table.cells() {
        grid[cell.row_index as usize][cell.column_index as usize] = Some(cell.content.clone());
    }
    grid
}

/// Renders `grid` under a `Table: <title>` line with `+---+` borders around every row.
/// Column width is the widest rendered cell in that column; `None` renders as empty.
/// Embedded newlines are flattened to spaces so every row stays on one line.
pub fn render_grid(title: &str, grid: &[Vec<Option<String>>]) -> String {
    let column_count = grid.iter().map(Vec::len).max().unwrap_or(0);
    if grid.is_empty() || column_count == 0 {
        return EMPTY_TABLE.to_string();
    }

    let rendered: Vec<Vec<String>> = grid
        .iter()
        .map(|row| {
            (0..column_count)
                .map(|col| {
                    row.get(col)
                        .and_then(|c| c.as_deref())
                        .map(|text| text.replace(['\r', '\n'], " "))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..column_count)
        .map(|col| {
            rendered
                .iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = widths.iter().fold(String::from("+"), |mut line, w| {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
        line
    });

    let mut lines = Vec::with_capacity(rendered.len() * 2 + 2);
    lines.push(format!("Table: {title}"));
    lines.push(border.clone());
    for row in &rendered {
        let mut line = String::from("|");
        for (text, width) in row.iter().zip(&widths) {
            let pad = width - text.chars().count();
            line.push(' ');
            line.push_str(text);
            line.push_str(&" ".repeat(pad + 1));
            line.push('|');
        }
        lines.push(line);
        lines.push(border.clone());
    }

    lines.join("\n")
}
