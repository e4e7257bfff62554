//! Visual cues: page-addressed signals detected by the image-analysis pass.
//!
//! A cue is either geometric (a pixel rectangle) or textual (a detected line with its
//! bounding polygon). Cues never carry table coordinates from the extractor; the
//! optional `anchor` is filled in only by a producer that has already resolved pixel
//! positions to a `(row, column)` pair.

pub mod extractor;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use extractor::extract_cues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueType {
    Checkbox,
    FilledArea,
    Handwritten,
    Signature,
    Table,
    Unknown,
}

impl CueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueType::Checkbox => "checkbox",
            CueType::FilledArea => "filled_area",
            CueType::Handwritten => "handwritten",
            CueType::Signature => "signature",
            CueType::Table => "table",
            CueType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// width / height, or `None` for a degenerate box.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueFootprint {
    Geometric(BoundingBox),
    Textual {
        text: String,
        /// Flattened `[x1, y1, x2, y2, ...]` polygon as reported by the read pass.
        bounding_polygon: Vec<f64>,
    },
}

/// Table coordinates resolved by an upstream producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAnchor {
    pub row_index: u32,
    pub column_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub page_number: u32,
    pub cue_type: CueType,
    pub footprint: CueFootprint,
    /// Always within [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<CellAnchor>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Cue {
    pub fn geometric(page_number: u32, cue_type: CueType, region: BoundingBox, confidence: f64) -> Self {
        Self {
            page_number,
            cue_type,
            footprint: CueFootprint::Geometric(region),
            confidence: clamp_confidence(confidence),
            anchor: None,
            metadata: Map::new(),
        }
    }

    pub fn textual(
        page_number: u32,
        cue_type: CueType,
        text: impl Into<String>,
        bounding_polygon: Vec<f64>,
        confidence: f64,
    ) -> Self {
        Self {
            page_number,
            cue_type,
            footprint: CueFootprint::Textual {
                text: text.into(),
                bounding_polygon,
            },
            confidence: clamp_confidence(confidence),
            anchor: None,
            metadata: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn anchored_at(mut self, row_index: u32, column_index: u32) -> Self {
        self.anchor = Some(CellAnchor {
            row_index,
            column_index,
        });
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// True if this cue is on `page_number` and anchored to exactly `(row, column)`.
    pub fn targets(&self, page_number: u32, row_index: u32, column_index: u32) -> bool {
        self.page_number == page_number
            && self.anchor
                == Some(CellAnchor {
                    row_index,
                    column_index,
                })
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
