//! Selection decoding for skill-assessment style tables.
//!
//! Column 0 holds the item label, column 1 is unused, and columns 2..=7 are six option
//! slots. A slot is chosen when its content carries the `:selected:` token emitted by
//! document analysis for a ticked selection mark.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::table::Table;

pub const SELECTED_MARKER: &str = ":selected:";

const LABEL_COLUMN: u32 = 0;
const FIRST_OPTION_COLUMN: u32 = 2;
const LAST_OPTION_COLUMN: u32 = 7;

/// How a row with the marker in more than one option slot is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Highest marked slot wins.
    #[default]
    LastMatch,
    /// Lowest marked slot wins.
    FirstMatch,
    /// Rows with more than one marked slot are dropped.
    RejectAmbiguous,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_match" => Ok(SelectionPolicy::LastMatch),
            "first_match" => Ok(SelectionPolicy::FirstMatch),
            "reject_ambiguous" => Ok(SelectionPolicy::RejectAmbiguous),
            other => Err(format!(
                "unknown selection policy '{other}' (expected last_match, first_match or reject_ambiguous)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSelection {
    pub skill: String,
    /// 0-based option slot, i.e. `column_index - 2`.
    pub selected_option: u32,
}

/// Decodes one `(skill, option)` pair per row that has a non-empty label and at least one
/// marked option slot, in row order. Ties are resolved by `policy`.
pub fn decode_selections(table: &Table, policy: SelectionPolicy) -> Vec<SkillSelection> {
    table
        .row_indices()
        .into_iter()
        .filter_map(|row| {
            let skill = table
                .cell(row, LABEL_COLUMN)
                .map(|c| c.content.replace('\n', " ").trim().to_string())
                .filter(|label| !label.is_empty())?;

            let marked: Vec<u32> = (FIRST_OPTION_COLUMN..=LAST_OPTION_COLUMN)
                .filter(|&col| {
                    table
                        .cell(row, col)
                        .is_some_and(|c| c.content.contains(SELECTED_MARKER))
                })
                .map(|col| col - FIRST_OPTION_COLUMN)
                .collect();

            let selected_option = match (policy, marked.as_slice()) {
                (_, []) => return None,
                (SelectionPolicy::RejectAmbiguous, [only]) => *only,
                (SelectionPolicy::RejectAmbiguous, _) => return None,
                (SelectionPolicy::FirstMatch, [first, ..]) => *first,
                (SelectionPolicy::LastMatch, [.., last]) => *last,
            };

            Some(SkillSelection {
                skill,
                selected_option,
            })
        })
        .collect()
}
