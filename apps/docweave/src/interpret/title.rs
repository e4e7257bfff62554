//! Table title inference.

use crate::layout::table::Table;

/// Returned when no rule produces a title.
pub const UNKNOWN_TABLE_TITLE: &str = "Unknown Table";

/// Infers a human-readable title for `table`, trying in order:
///
/// 1. a cell in the first row spanning every column, with non-empty content;
/// 2. the page line directly above the line equal to the first row's first cell;
/// 3. the first row's first cell itself;
/// 4. [`UNKNOWN_TABLE_TITLE`].
///
/// The first rule producing a non-empty string wins. Comparisons and results are trimmed.
/// A blank first cell skips rules 2 and 3: it would otherwise match any blank page line
/// and take whatever line precedes it as the title.
pub fn infer_title(table: &Table, page_lines: &[String]) -> String {
    let Some(first_row) = table.first_row_index() else {
        return UNKNOWN_TABLE_TITLE.to_string();
    };

    let full_span = table
        .row(first_row)
        .filter(|c| c.column_span == table.column_count())
        .map(|c| c.content.trim())
        .find(|content| !content.is_empty());
    if let Some(title) = full_span {
        return title.to_string();
    }

    let first_cell = table
        .row(first_row)
        .next()
        .map(|c| c.content.trim())
        .unwrap_or_default();
    if first_cell.is_empty() {
        return UNKNOWN_TABLE_TITLE.to_string();
    }

    if let Some(caption) = line_above(page_lines, first_cell) {
        return caption.to_string();
    }

    first_cell.to_string()
}

/// Trimmed, non-empty line immediately preceding the first line equal to `needle`.
fn line_above<'a>(page_lines: &'a [String], needle: &str) -> Option<&'a str> {
    let position = page_lines.iter().position(|line| line.trim() == needle)?;
    let previous = page_lines.get(position.checked_sub(1)?)?.trim();
    (!previous.is_empty()).then_some(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::table::Cell;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_span_header_wins_regardless_of_lines() {
        let table = Table::new(
            2,
            3,
            vec![
                Cell::new(0, 0, "  Skills Matrix \n").with_spans(1, 3),
                Cell::new(1, 0, "Python"),
            ],
        )
        .unwrap();

        assert_eq!(infer_title(&table, &[]), "Skills Matrix");
        assert_eq!(
            infer_title(&table, &lines(&["Other", "Skills Matrix"])),
            "Skills Matrix"
        );
    }

    #[test]
    fn test_line_above_first_cell() {
        let table = Table::new(2, 2, vec![Cell::new(0, 0, "Foo"), Cell::new(0, 1, "Bar")]).unwrap();
        assert_eq!(
            infer_title(&table, &lines(&["Skill Assessment", "Foo", "..."])),
            "Skill Assessment"
        );
    }

    #[test]
    fn test_first_cell_when_it_is_the_first_line() {
        let table = Table::new(1, 2, vec![Cell::new(0, 0, "Foo"), Cell::new(0, 1, "Bar")]).unwrap();
        assert_eq!(infer_title(&table, &lines(&["Foo", "Skill Assessment"])), "Foo");
    }

    #[test]
    fn test_first_cell_when_line_not_found() {
        let table = Table::new(1, 2, vec![Cell::new(0, 0, " Foo ")]).unwrap();
        assert_eq!(infer_title(&table, &lines(&["Something else"])), "Foo");
    }

    #[test]
    fn test_blank_line_above_falls_back_to_first_cell() {
        let table = Table::new(1, 2, vec![Cell::new(0, 0, "Foo")]).unwrap();
        assert_eq!(infer_title(&table, &lines(&["   ", "Foo"])), "Foo");
    }

    #[test]
    fn test_empty_full_span_cell_is_skipped() {
        let table = Table::new(
            2,
            2,
            vec![Cell::new(0, 0, "   ").with_spans(1, 2), Cell::new(1, 0, "x")],
        )
        .unwrap();
        // The full-span cell is also the first cell, and it is blank.
        assert_eq!(infer_title(&table, &lines(&["Caption", ""])), UNKNOWN_TABLE_TITLE);
    }

    #[test]
    fn test_blank_first_cell_does_not_match_blank_line() {
        let table = Table::new(2, 3, vec![Cell::new(0, 0, ""), Cell::new(0, 1, "Level")]).unwrap();
        assert_eq!(
            infer_title(&table, &lines(&["Caption", "", "Level"])),
            UNKNOWN_TABLE_TITLE
        );
    }

    #[test]
    fn test_unknown_for_table_without_cells() {
        let table = Table::new(0, 0, vec![]).unwrap();
        assert_eq!(infer_title(&table, &lines(&["anything"])), UNKNOWN_TABLE_TITLE);
    }

    #[test]
    fn test_uses_minimum_row_even_if_not_zero() {
        let table = Table::new(3, 2, vec![Cell::new(2, 0, "Late"), Cell::new(1, 1, "Early")]).unwrap();
        assert_eq!(infer_title(&table, &lines(&["Heading", "Early"])), "Heading");
    }
}
