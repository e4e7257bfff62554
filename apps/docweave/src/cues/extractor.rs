//! Cue extraction: turns one page's `VisionAnalysis` into a flat list of cues.
//!
//! Output order is objects, then the dominant colour, then handwritten lines.

use serde_json::Value;

use crate::analysis::vision::{DetectedLine, DetectedObject, DominantColor, VisionAnalysis};
use crate::cues::{BoundingBox, Cue, CueType};

const CHECKBOX_MIN_ASPECT: f64 = 0.8;
const CHECKBOX_MAX_ASPECT: f64 = 1.2;
const CHECKBOX_MIN_SIDE_PX: f64 = 10.0;
const CHECKBOX_MAX_SIDE_PX: f64 = 50.0;
const CHECKBOX_MIN_CONFIDENCE: f64 = 0.6;
const TABLE_MIN_SIDE_PX: f64 = 100.0;

const SIGNATURE_MAX_TOKENS: usize = 3;
const SIGNATURE_MAX_CHARS: usize = 50;

/// Extracts the cues of one page. Absent vision data yields an empty list; the caller
/// decides whether that deserves a warning.
pub fn extract_cues(analysis: Option<&VisionAnalysis>, page_number: u32) -> Vec<Cue> {
    let Some(analysis) = analysis else {
        return Vec::new();
    };

    let mut cues: Vec<Cue> = analysis
        .objects
        .iter()
        .filter_map(|obj| object_cue(obj, page_number))
        .collect();

    if let Some(color) = &analysis.dominant_color {
        if let Some(cue) = color_cue(color, analysis, page_number) {
            cues.push(cue);
        }
    }

    cues.extend(
        analysis
            .text_lines
            .iter()
            .filter(|line| line.is_handwritten)
            .map(|line| handwriting_cue(line, page_number)),
    );

    cues
}

fn classify_object(obj: &DetectedObject) -> Option<CueType> {
    let BoundingBox { width, height, .. } = obj.rectangle;
    let side_in_range = |side: f64| (CHECKBOX_MIN_SIDE_PX..=CHECKBOX_MAX_SIDE_PX).contains(&side);

    let is_checkbox = obj
        .rectangle
        .aspect_ratio()
        .is_some_and(|ratio| (CHECKBOX_MIN_ASPECT..=CHECKBOX_MAX_ASPECT).contains(&ratio))
        && side_in_range(width)
        && side_in_range(height)
        && obj.confidence > CHECKBOX_MIN_CONFIDENCE;
    if is_checkbox {
        return Some(CueType::Checkbox);
    }

    let is_table = width > TABLE_MIN_SIDE_PX
        && height > TABLE_MIN_SIDE_PX
        && obj.tags.iter().any(|t| t.eq_ignore_ascii_case("table"));
    is_table.then_some(CueType::Table)
}

fn object_cue(obj: &DetectedObject, page_number: u32) -> Option<Cue> {
    let cue_type = classify_object(obj)?;
    Some(
        Cue::geometric(page_number, cue_type, obj.rectangle, obj.confidence)
            .with_metadata("source", "object_detection")
            .with_metadata(
                "tags",
                Value::Array(obj.tags.iter().cloned().map(Value::String).collect()),
            ),
    )
}

fn is_gray(name: &str) -> bool {
    matches!(name.trim().to_lowercase().as_str(), "gray" | "grey")
}

fn color_cue(color: &DominantColor, analysis: &VisionAnalysis, page_number: u32) -> Option<Cue> {
    if !is_gray(&color.name) {
        return None;
    }
    // Dominant colour describes the whole image.
    let region = BoundingBox::new(
        0.0,
        0.0,
        f64::from(analysis.image_width.unwrap_or(0)),
        f64::from(analysis.image_height.unwrap_or(0)),
    );
    Some(
        Cue::geometric(page_number, CueType::FilledArea, region, color.confidence)
            .with_metadata("source", "dominant_color")
            .with_metadata("color", color.name.clone()),
    )
}

fn handwriting_cue(line: &DetectedLine, page_number: u32) -> Cue {
    let cue_type = if is_signature_like(&line.content) {
        CueType::Signature
    } else {
        CueType::Handwritten
    };
    let mut cue = Cue::textual(
        page_number,
        cue_type,
        line.content.clone(),
        line.bounding_polygon.clone(),
        line.confidence,
    )
    .with_metadata("source", "read");
    if let Some(language) = &line.language {
        cue = cue.with_metadata("language", language.clone());
    }
    cue
}

/// Heuristic for a handwritten signature: at most three words, at least one letter,
/// shorter than 50 characters, not all caps and no digits. Every condition must hold.
/// Text counts as all caps only when it has an uppercase letter and no lowercase ones,
/// so scripts without case (CJK, Arabic) are never all caps. Digits are any Unicode
/// numeric character.
pub fn is_signature_like(text: &str) -> bool {
    let has_letter = text.chars().any(char::is_alphabetic);
    let all_caps =
        text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase);

    text.split_whitespace().count() <= SIGNATURE_MAX_TOKENS
        && has_letter
        && text.chars().count() < SIGNATURE_MAX_CHARS
        && !all_caps
        && !text.chars().any(char::is_numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(width: f64, height: f64, confidence: f64, tags: &[&str]) -> DetectedObject {
        DetectedObject {
            rectangle: BoundingBox::new(0.0, 0.0, width, height),
            confidence,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn handwritten(text: &str) -> DetectedLine {
        DetectedLine {
            content: text.to_string(),
            is_handwritten: true,
            confidence: 0.9,
            bounding_polygon: vec![0.0, 0.0, 1.0, 1.0],
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn test_absent_analysis_yields_no_cues() {
        assert!(extract_cues(None, 1).is_empty());
        assert!(extract_cues(Some(&VisionAnalysis::default()), 1).is_empty());
    }

    #[test]
    fn test_checkbox_requires_confidence_above_threshold() {
        let confident = VisionAnalysis {
            objects: vec![object(20.0, 22.0, 0.7, &[])],
            ..Default::default()
        };
        let cues = extract_cues(Some(&confident), 3);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].cue_type, CueType::Checkbox);
        assert_eq!(cues[0].page_number, 3);

        let unsure = VisionAnalysis {
            objects: vec![object(20.0, 22.0, 0.5, &[])],
            ..Default::default()
        };
        assert!(extract_cues(Some(&unsure), 3).is_empty());
    }

    #[test]
    fn test_checkbox_bounds_are_inclusive() {
        assert_eq!(classify_object(&object(10.0, 10.0, 0.9, &[])), Some(CueType::Checkbox));
        assert_eq!(classify_object(&object(50.0, 50.0, 0.9, &[])), Some(CueType::Checkbox));
        assert_eq!(classify_object(&object(40.0, 50.0, 0.9, &[])), Some(CueType::Checkbox));
        assert_eq!(classify_object(&object(9.0, 9.0, 0.9, &[])), None);
        assert_eq!(classify_object(&object(51.0, 50.0, 0.9, &[])), None);
        // aspect 30/20 = 1.5
        assert_eq!(classify_object(&object(30.0, 20.0, 0.9, &[])), None);
        assert_eq!(classify_object(&object(20.0, 20.0, 0.6, &[])), None);
    }

    #[test]
    fn test_table_requires_tag_and_size() {
        assert_eq!(
            classify_object(&object(300.0, 200.0, 0.2, &["Table"])),
            Some(CueType::Table)
        );
        assert_eq!(classify_object(&object(300.0, 200.0, 0.9, &["chart"])), None);
        assert_eq!(classify_object(&object(100.0, 200.0, 0.9, &["table"])), None);
    }

    #[test]
    fn test_gray_dominant_color_becomes_filled_area() {
        let analysis = VisionAnalysis {
            dominant_color: Some(DominantColor {
                name: " Grey ".to_string(),
                confidence: 0.65,
            }),
            image_width: Some(800),
            image_height: Some(600),
            ..Default::default()
        };
        let cues = extract_cues(Some(&analysis), 1);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].cue_type, CueType::FilledArea);
        assert!((cues[0].confidence - 0.65).abs() < 1e-9);

        let white = VisionAnalysis {
            dominant_color: Some(DominantColor {
                name: "White".to_string(),
                confidence: 0.9,
            }),
            ..Default::default()
        };
        assert!(extract_cues(Some(&white), 1).is_empty());
    }

    #[test]
    fn test_signature_heuristic() {
        assert!(is_signature_like("John Smith"));
        assert!(is_signature_like("J. R. Tolkien"));
        assert!(!is_signature_like("MEETING NOTES 2024"));
        assert!(!is_signature_like("JOHN SMITH"));
        assert!(!is_signature_like("John Smith 2"));
        assert!(!is_signature_like("one two three four"));
        assert!(!is_signature_like("..."));
        assert!(!is_signature_like(&"a".repeat(50)));

        assert!(is_signature_like("李明"));
        assert!(is_signature_like("José Núñez"));
        assert!(!is_signature_like("ÉLODIE"));
        assert!(!is_signature_like("Ana ٣"));
        assert!(!is_signature_like("Ana ²"));
    }

    #[test]
    fn test_only_handwritten_lines_become_cues() {
        let mut printed = handwritten("Invoice total");
        printed.is_handwritten = false;
        let analysis = VisionAnalysis {
            text_lines: vec![
                printed,
                handwritten("John Smith"),
                handwritten("MEETING NOTES 2024"),
            ],
            ..Default::default()
        };

        let cues = extract_cues(Some(&analysis), 2);
        let types: Vec<CueType> = cues.iter().map(|c| c.cue_type).collect();
        assert_eq!(types, vec![CueType::Signature, CueType::Handwritten]);
        assert_eq!(cues[0].metadata.get("language"), Some(&Value::from("en")));
    }

    #[test]
    fn test_output_order_objects_colors_lines() {
        let analysis = VisionAnalysis {
            objects: vec![object(20.0, 20.0, 0.9, &[]), object(9.0, 9.0, 0.9, &[])],
            dominant_color: Some(DominantColor {
                name: "gray".to_string(),
                confidence: 0.5,
            }),
            text_lines: vec![handwritten("Ana Ruiz")],
            ..Default::default()
        };

        let types: Vec<CueType> = extract_cues(Some(&analysis), 1)
            .iter()
            .map(|c| c.cue_type)
            .collect();
        assert_eq!(
            types,
            vec![CueType::Checkbox, CueType::FilledArea, CueType::Signature]
        );
    }
}
