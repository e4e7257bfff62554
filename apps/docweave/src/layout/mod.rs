// Layout model: document, pages, tables and cells, plus assembly and cue merging.

pub mod assembler;
pub mod document;
pub mod merger;
pub mod table;

pub use assembler::LayoutBuilder;
pub use document::{FileType, LayoutDocument, ProcessingTime, StorageInfo};
pub use merger::merge_cues;
pub use table::{Cell, LayoutError, Table};
