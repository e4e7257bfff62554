use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::layout::{FileType, ProcessingTime};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Classifies an input by its extension (case-insensitive).
pub fn detect_file_type(filename: &str) -> Result<FileType, AppError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "pdf" {
        Ok(FileType::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(FileType::Image)
    } else {
        Err(AppError::UnsupportedMedia(format!(
            "'{filename}' is not a supported file type (expected pdf, {})",
            IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Truncates on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn calculate_processing_time(start: DateTime<Utc>, end: DateTime<Utc>) -> ProcessingTime {
    let duration = end - start;
    let micros = duration.num_microseconds().unwrap_or(i64::MAX).max(0);

    ProcessingTime {
        duration_seconds: micros as f64 / 1_000_000.0,
        duration_formatted: format_duration(micros),
        start_time: start,
        end_time: end,
    }
}

/// `H:MM:SS.ffffff`
fn format_duration(micros: i64) -> String {
    let total_seconds = micros / 1_000_000;
    let fraction = micros % 1_000_000;
    format!(
        "{}:{:02}:{:02}.{:06}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60,
        fraction
    )
}
