//! Cue merger: attaches at most one visual cue to each table cell.
//!
//! Association is exact equality on page number and the cue's resolved cell anchor. No
//! geometric reconciliation happens here: cues arrive either anchored by an upstream
//! producer or not at all, and unanchored cues never touch a cell.

use crate::cues::Cue;
use crate::layout::table::Table;

/// Returns `table` with each cell's `visual_cue` set to the type of the first cue in
/// `cues` that targets that cell on `page_number`. Later matches for the same cell are
/// discarded. Cells without a match end up with no cue, so merging with an empty list
/// clears any earlier association.
pub fn merge_cues(table: Table, cues: &[Cue], page_number: u32) -> Table {
    table.with_visual_cues(|cell| {
        cues.iter()
            .find(|cue| cue.targets(page_number, cell.row_index, cell.column_index))
            .map(|cue| cue.cue_type)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cues::{BoundingBox, CueType};
    use crate::layout::table::Cell;

    fn square() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 20.0, 20.0)
    }

    fn two_by_two() -> Table {
        Table::new(
            2,
            2,
            vec![
                Cell::new(0, 0, "A"),
                Cell::new(0, 1, "B"),
                Cell::new(1, 0, "C"),
                Cell::new(1, 1, "D"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_merge_with_no_cues_clears_every_cell() {
        let marked = merge_cues(
            two_by_two(),
            &[Cue::geometric(1, CueType::Checkbox, square(), 0.9).anchored_at(0, 0)],
            1,
        );
        assert_eq!(marked.cell(0, 0).unwrap().visual_cue, Some(CueType::Checkbox));

        let cleared = merge_cues(marked, &[], 1);
        assert!(cleared.cells().iter().all(|c| c.visual_cue.is_none()));
        assert_eq!(cleared, two_by_two());
    }

    #[test]
    fn test_merge_attaches_matching_cue_only() {
        let cues = vec![Cue::geometric(1, CueType::Checkbox, square(), 0.9).anchored_at(1, 0)];
        let merged = merge_cues(two_by_two(), &cues, 1);

        assert_eq!(merged.cell(1, 0).unwrap().visual_cue, Some(CueType::Checkbox));
        for key in [(0, 0), (0, 1), (1, 1)] {
            assert_eq!(merged.cell(key.0, key.1).unwrap().visual_cue, None);
        }
    }

    #[test]
    fn test_merge_ignores_other_pages_and_unanchored_cues() {
        let cues = vec![
            Cue::geometric(2, CueType::Checkbox, square(), 0.9).anchored_at(0, 0),
            Cue::textual(1, CueType::Signature, "Ana Ruiz", vec![], 0.8),
        ];
        let merged = merge_cues(two_by_two(), &cues, 1);
        assert!(merged.cells().iter().all(|c| c.visual_cue.is_none()));
    }

    #[test]
    fn test_merge_first_matching_cue_wins() {
        let cues = vec![
            Cue::geometric(1, CueType::FilledArea, square(), 0.5).anchored_at(0, 1),
            Cue::geometric(1, CueType::Checkbox, square(), 0.99).anchored_at(0, 1),
        ];
        let merged = merge_cues(two_by_two(), &cues, 1);
        assert_eq!(merged.cell(0, 1).unwrap().visual_cue, Some(CueType::FilledArea));
    }

    #[test]
    fn test_merge_preserves_content_and_spans() {
        let table = Table::new(1, 3, vec![Cell::new(0, 0, "Header").with_spans(1, 3)]).unwrap();
        let merged = merge_cues(
            table.clone(),
            &[Cue::geometric(1, CueType::Table, square(), 0.7).anchored_at(0, 0)],
            1,
        );
        let cell = merged.cell(0, 0).unwrap();
        assert_eq!(cell.content, "Header");
        assert_eq!(cell.column_span, 3);
        assert_eq!(merged.row_count(), table.row_count());
    }
}
