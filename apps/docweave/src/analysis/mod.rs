//! External analysis collaborators: document layout analysis and image analysis.
//!
//! Both are traits so that `AppState` carries `Arc<dyn ...>` handles built once in `main`;
//! tests swap in canned implementations.

pub mod document_intelligence;
pub mod vision;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use document_intelligence::{AnalyzeResult, DocumentIntelligenceClient};
pub use vision::{VisionAnalysis, VisionClient};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("analysis operation failed: {0}")]
    OperationFailed(String),

    #[error("analysis still running after {polls} polls")]
    Timeout { polls: u32 },

    #[error("response is missing {0}")]
    MissingField(&'static str),
}

/// Produces the page / line / table / selection-mark tree of a document.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, document: Bytes) -> Result<AnalyzeResult, AnalysisError>;
}

/// Produces object, colour and text detections for one page image.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: Bytes, request_id: &str) -> Result<VisionAnalysis, AnalysisError>;
}
