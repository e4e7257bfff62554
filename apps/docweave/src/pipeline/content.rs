use std::fmt::Write;

use crate::layout::{FileType, LayoutDocument};
use crate::pipeline::files::truncate_chars;

/// Upper bound on the text sent to the LLM.
pub const MAX_LLM_CONTENT_CHARS: usize = 8000;

/// Flattens a document into the plain-text body the LLM analyses.
pub fn prepare_content_for_llm(document: &LayoutDocument) -> String {
    let mut content = String::new();

    match document.metadata().file_type {
        FileType::Pdf => {
            for page in document.pages() {
                let _ = write!(content, "\n--- PAGE {} ---\n", page.page_number);
                content.push_str(&page.lines.join("\n"));

                for (index, table) in page.tables.iter().enumerate() {
                    let _ = write!(content, "\n--- TABLE {} ---\n", index + 1);
                    for cell in table.cells() {
                        let _ = writeln!(
                            content,
                            "[Row {}, Col {}]: {}",
                            cell.row_index, cell.column_index, cell.content
                        );
                    }
                }
            }
        }
        FileType::Image => {
            let caption = document
                .auxiliary()
                .vision_analysis
                .as_ref()
                .map(|v| v.caption.as_str())
                .unwrap_or_default();
            let _ = writeln!(content, "Image caption: {caption}");
            content.push_str("Extracted text:\n");
            if let Some(page) = document.pages().first() {
                for line in &page.lines {
                    let _ = writeln!(content, "{line}");
                }
            }
        }
    }

    truncate_chars(&content, MAX_LLM_CONTENT_CHARS).to_string()
}
