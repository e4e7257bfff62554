//! Azure AI Vision client and the normalized `VisionAnalysis` it produces.
//!
//! The service answers in two shapes depending on the API version: Image Analysis 4.0
//! (`captionResult`, `objectsResult`, `readResult`) and the legacy v3.2 analyze call
//! (`description`, `objects`, `color`). Both are folded into one typed structure here so
//! that cue extraction only ever sees explicit optional fields.
//!
//! Neither shape carries every signal the cue extractor looks for. Image Analysis 4.0 has
//! no colour feature and reports no handwriting style on read lines, so filled-area and
//! handwriting cues never appear with the 4.0 versions. The v3.2 analyze call reports
//! dominant colours but requests no read feature, so its text lines only appear when a
//! response happens to carry `analyzeResult.readResults`.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::analysis::{AnalysisError, ImageAnalyzer};
use crate::cues::BoundingBox;

/// API versions accepted by `VISION_API_VERSION`. `v3.2` selects the legacy analyze call,
/// the only one that reports dominant colours.
pub const SUPPORTED_VERSIONS: &[&str] = &["2024-04-01", "2024-02-01-preview", "2023-10-01", "v3.2"];
pub const DEFAULT_VERSION: &str = "2024-04-01";

/// Used when the colour detector reports a dominant colour without a score.
const UNSCORED_COLOR_CONFIDENCE: f64 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Normalized result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionAnalysis {
    pub caption: Option<Caption>,
    pub objects: Vec<DetectedObject>,
    pub dominant_color: Option<DominantColor>,
    pub text_lines: Vec<DetectedLine>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub request_id: Option<String>,
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub rectangle: BoundingBox,
    pub confidence: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLine {
    pub content: String,
    pub is_handwritten: bool,
    pub confidence: f64,
    pub bounding_polygon: Vec<f64>,
    pub language: Option<String>,
}

impl VisionAnalysis {
    /// Read lines in reading order, as plain strings.
    pub fn line_texts(&self) -> Vec<String> {
        self.text_lines.iter().map(|l| l.content.clone()).collect()
    }

    /// Maps a raw service response into the normalized form. Unknown or missing
    /// attributes become empty / `None`; nothing here fails.
    pub fn from_response(raw: &Value, api_version: &str) -> Self {
        let metadata = raw.get("metadata");
        Self {
            caption: parse_caption(raw),
            objects: parse_objects(raw),
            dominant_color: parse_color(raw),
            text_lines: parse_read_lines(raw),
            image_width: metadata.and_then(|m| m.get("width")).and_then(as_u32),
            image_height: metadata.and_then(|m| m.get("height")).and_then(as_u32),
            request_id: raw
                .get("requestId")
                .and_then(|v| v.as_str())
                .map(String::from),
            api_version: Some(api_version.to_string()),
        }
    }
}

fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn parse_caption(raw: &Value) -> Option<Caption> {
    let caption = raw.get("captionResult").or_else(|| {
        raw.get("description")
            .and_then(|d| d.get("captions"))
            .and_then(|c| c.get(0))
    })?;
    Some(Caption {
        text: caption.get("text")?.as_str()?.to_string(),
        confidence: caption
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
    })
}

fn parse_rect(rect: &Value) -> Option<BoundingBox> {
    Some(BoundingBox::new(
        rect.get("x")?.as_f64()?,
        rect.get("y")?.as_f64()?,
        rect.get("w")?.as_f64()?,
        rect.get("h")?.as_f64()?,
    ))
}

fn parse_objects(raw: &Value) -> Vec<DetectedObject> {
    // 4.0: objectsResult.values[] { boundingBox, tags[{name, confidence}] }
    if let Some(values) = raw
        .get("objectsResult")
        .and_then(|o| o.get("values"))
        .and_then(|v| v.as_array())
    {
        return values
            .iter()
            .filter_map(|obj| {
                let rectangle = parse_rect(obj.get("boundingBox")?)?;
                let tags = obj.get("tags").and_then(|t| t.as_array());
                let names = tags
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|t| t.get("name").and_then(|n| n.as_str()))
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                let confidence = tags
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|t| t.get("confidence").and_then(|c| c.as_f64()))
                            .fold(0.0_f64, f64::max)
                    })
                    .unwrap_or(0.0);
                Some(DetectedObject {
                    rectangle,
                    confidence,
                    tags: names,
                })
            })
            .collect();
    }

    // v3.2: objects[] { rectangle, object, confidence, parent{object} }
    raw.get("objects")
        .and_then(|v| v.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|obj| {
                    let rectangle = parse_rect(obj.get("rectangle")?)?;
                    let mut tags = Vec::new();
                    let mut parent = Some(obj);
                    while let Some(node) = parent {
                        if let Some(name) = node.get("object").and_then(|n| n.as_str()) {
                            tags.push(name.to_string());
                        }
                        parent = node.get("parent");
                    }
                    Some(DetectedObject {
                        rectangle,
                        confidence: obj
                            .get("confidence")
                            .and_then(|c| c.as_f64())
                            .unwrap_or(0.0),
                        tags,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_color(raw: &Value) -> Option<DominantColor> {
    let color = raw.get("color")?;
    let name = color
        .get("dominantColors")
        .and_then(|c| c.get(0))
        .or_else(|| color.get("dominantColorBackground"))
        .and_then(|v| v.as_str())?;
    Some(DominantColor {
        name: name.to_string(),
        confidence: color
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(UNSCORED_COLOR_CONFIDENCE),
    })
}

fn parse_read_lines(raw: &Value) -> Vec<DetectedLine> {
    let mut lines = Vec::new();

    // 4.0: readResult.blocks[].lines[] { text, boundingPolygon[{x, y}], words[{confidence}] }
    if let Some(blocks) = raw
        .get("readResult")
        .and_then(|r| r.get("blocks"))
        .and_then(|b| b.as_array())
    {
        for line in blocks
            .iter()
            .filter_map(|b| b.get("lines").and_then(|l| l.as_array()))
            .flatten()
        {
            if let Some(parsed) = parse_line(line) {
                lines.push(parsed);
            }
        }
        return lines;
    }

    // v3.2 read: analyzeResult.readResults[].lines[] { text, boundingBox[8], appearance }
    if let Some(pages) = raw
        .get("analyzeResult")
        .and_then(|r| r.get("readResults"))
        .and_then(|p| p.as_array())
    {
        for line in pages
            .iter()
            .filter_map(|p| p.get("lines").and_then(|l| l.as_array()))
            .flatten()
        {
            if let Some(parsed) = parse_line(line) {
                lines.push(parsed);
            }
        }
    }
    lines
}

fn parse_line(line: &Value) -> Option<DetectedLine> {
    let content = line.get("text")?.as_str()?.to_string();

    let bounding_polygon = match line.get("boundingPolygon").and_then(|p| p.as_array()) {
        Some(points) => points
            .iter()
            .flat_map(|pt| [pt.get("x"), pt.get("y")])
            .filter_map(|v| v.and_then(|n| n.as_f64()))
            .collect(),
        None => line
            .get("boundingBox")
            .and_then(|b| b.as_array())
            .map(|arr| arr.iter().filter_map(|n| n.as_f64()).collect())
            .unwrap_or_default(),
    };

    let style = line.get("appearance").and_then(|a| a.get("style"));
    let is_handwritten = line
        .get("isHandwritten")
        .and_then(|v| v.as_bool())
        .unwrap_or_else(|| {
            style.and_then(|s| s.get("name")).and_then(|n| n.as_str()) == Some("handwriting")
        });

    let confidence = line
        .get("confidence")
        .and_then(|v| v.as_f64())
        .or_else(|| style.and_then(|s| s.get("confidence")).and_then(|v| v.as_f64()))
        .or_else(|| mean_word_confidence(line))
        .unwrap_or(0.0);

    Some(DetectedLine {
        content,
        is_handwritten,
        confidence,
        bounding_polygon,
        language: line
            .get("language")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

fn mean_word_confidence(line: &Value) -> Option<f64> {
    let scores: Vec<f64> = line
        .get("words")?
        .as_array()?
        .iter()
        .filter_map(|w| w.get("confidence").and_then(|c| c.as_f64()))
        .collect();
    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    endpoint: String,
    key: String,
    api_version: String,
}

impl VisionClient {
    pub fn new(endpoint: String, key: String, api_version: String) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            api_version,
        })
    }

    fn analyze_url(&self) -> String {
        if self.api_version == "v3.2" {
            format!(
                "{}/vision/v3.2/analyze?visualFeatures=Description,Objects,Color",
                self.endpoint
            )
        } else {
            format!(
                "{}/computervision/imageanalysis:analyze?api-version={}&features=caption,read,objects",
                self.endpoint, self.api_version
            )
        }
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, image: Bytes, request_id: &str) -> Result<VisionAnalysis, AnalysisError> {
        let url = self.analyze_url();
        info!("[Vision-{request_id}] Making request to: {url}");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("x-ms-client-request-id", request_id)
            .body(image)
            .send()
            .await?;

        let status = response.status();
        info!(
            "[Vision-{request_id}] Response received in {:.2}s with status {}",
            started.elapsed().as_secs_f64(),
            status
        );

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("[Vision-{request_id}] Vision API error: {message}");
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: Value = response.json().await?;
        let mut analysis = VisionAnalysis::from_response(&raw, &self.api_version);
        analysis.request_id = Some(request_id.to_string());

        info!(
            "[Vision-{request_id}] Successfully processed with API version {}",
            self.api_version
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response_v4_shape() {
        let raw = json!({
            "captionResult": {"text": "a form with a table", "confidence": 0.81},
            "metadata": {"width": 850, "height": 1100},
            "objectsResult": {"values": [{
                "boundingBox": {"x": 10, "y": 20, "w": 300, "h": 200},
                "tags": [{"name": "table", "confidence": 0.7}, {"name": "furniture", "confidence": 0.4}]
            }]},
            "readResult": {"blocks": [{"lines": [{
                "text": "John Smith",
                "boundingPolygon": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
                "words": [{"text": "John", "confidence": 0.9}, {"text": "Smith", "confidence": 0.7}]
            }]}]}
        });

        let analysis = VisionAnalysis::from_response(&raw, "2024-04-01");

        assert_eq!(analysis.caption.as_ref().unwrap().text, "a form with a table");
        assert_eq!(analysis.image_width, Some(850));
        assert_eq!(analysis.objects.len(), 1);
        assert_eq!(analysis.objects[0].tags, vec!["table", "furniture"]);
        assert!((analysis.objects[0].confidence - 0.7).abs() < 1e-9);
        assert_eq!(analysis.text_lines.len(), 1);
        assert_eq!(analysis.text_lines[0].bounding_polygon, vec![1.0, 2.0, 3.0, 4.0]);
        assert!((analysis.text_lines[0].confidence - 0.8).abs() < 1e-9);
        assert!(!analysis.text_lines[0].is_handwritten);
        assert!(analysis.dominant_color.is_none());
        assert_eq!(analysis.api_version.as_deref(), Some("2024-04-01"));
    }

    #[test]
    fn test_from_response_v32_shape() {
        let raw = json!({
            "description": {"captions": [{"text": "a document", "confidence": 0.5}]},
            "objects": [{
                "rectangle": {"x": 5, "y": 5, "w": 20, "h": 22},
                "object": "checkbox",
                "confidence": 0.72,
                "parent": {"object": "box"}
            }],
            "color": {"dominantColors": ["Grey", "White"], "dominantColorBackground": "White"},
            "analyzeResult": {"readResults": [{"lines": [{
                "text": "Jane Doe",
                "boundingBox": [0, 0, 10, 0, 10, 5, 0, 5],
                "appearance": {"style": {"name": "handwriting", "confidence": 0.88}}
            }]}]}
        });

        let analysis = VisionAnalysis::from_response(&raw, "v3.2");

        assert_eq!(analysis.objects[0].tags, vec!["checkbox", "box"]);
        let color = analysis.dominant_color.unwrap();
        assert_eq!(color.name, "Grey");
        assert_eq!(color.confidence, UNSCORED_COLOR_CONFIDENCE);
        let line = &analysis.text_lines[0];
        assert!(line.is_handwritten);
        assert!((line.confidence - 0.88).abs() < 1e-9);
        assert_eq!(line.bounding_polygon.len(), 8);
    }

    #[test]
    fn test_from_response_empty_object_is_empty_analysis() {
        let analysis = VisionAnalysis::from_response(&json!({}), "2023-10-01");
        assert!(analysis.caption.is_none());
        assert!(analysis.objects.is_empty());
        assert!(analysis.text_lines.is_empty());
        assert!(analysis.dominant_color.is_none());
    }

    #[test]
    fn test_analyze_url_by_version() {
        let modern = VisionClient::new("https://v.example/".into(), "k".into(), "2023-10-01".into())
            .unwrap();
        assert_eq!(
            modern.analyze_url(),
            "https://v.example/computervision/imageanalysis:analyze?api-version=2023-10-01&features=caption,read,objects"
        );
        let legacy =
            VisionClient::new("https://v.example".into(), "k".into(), "v3.2".into()).unwrap();
        assert!(legacy.analyze_url().starts_with("https://v.example/vision/v3.2/analyze"));
    }
}
