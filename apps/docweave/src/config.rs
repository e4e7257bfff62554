use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::analysis::vision::{DEFAULT_VERSION, SUPPORTED_VERSIONS};
use crate::interpret::SelectionPolicy;

const DEFAULT_OPENAI_API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub endpoint: String,
    pub key: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the document-analysis credentials are missing; every other
/// collaborator is optional and is disabled when its variables are incomplete.
#[derive(Debug, Clone)]
pub struct Config {
    pub document_intelligence_endpoint: String,
    pub document_intelligence_key: String,
    pub vision: Option<VisionConfig>,
    pub openai: Option<OpenAiConfig>,
    pub database_url: Option<String>,
    pub s3: Option<S3Config>,
    pub selection_policy: SelectionPolicy,
    pub persist_table_summaries: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = ["DOCUMENT_INTELLIGENCE_ENDPOINT", "DOCUMENT_INTELLIGENCE_KEY"];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|&key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "Required environment variables are not set: {}",
                missing.join(", ")
            );
        }

        let vision = match (get("VISION_API_ENDPOINT"), get("VISION_API_KEY")) {
            (Some(endpoint), Some(key)) => {
                let api_version =
                    get("VISION_API_VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string());
                if !SUPPORTED_VERSIONS.contains(&api_version.as_str()) {
                    bail!(
                        "VISION_API_VERSION '{api_version}' is not supported (expected one of {})",
                        SUPPORTED_VERSIONS.join(", ")
                    );
                }
                Some(VisionConfig {
                    endpoint,
                    key,
                    api_version,
                })
            }
            _ => None,
        };

        let openai = match (
            get("AZURE_OPENAI_ENDPOINT"),
            get("AZURE_OPENAI_KEY"),
            get("AZURE_OPENAI_DEPLOYMENT"),
        ) {
            (Some(endpoint), Some(key), Some(deployment)) => Some(OpenAiConfig {
                endpoint,
                key,
                deployment,
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_VERSION.to_string()),
            }),
            _ => None,
        };

        let s3 = match (
            get("S3_BUCKET"),
            get("S3_ENDPOINT"),
            get("AWS_ACCESS_KEY_ID"),
            get("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(bucket), Some(endpoint), Some(aws_access_key_id), Some(aws_secret_access_key)) => {
                Some(S3Config {
                    bucket,
                    endpoint,
                    aws_access_key_id,
                    aws_secret_access_key,
                })
            }
            _ => None,
        };

        let selection_policy = match get("SELECTION_POLICY") {
            Some(raw) => raw
                .parse::<SelectionPolicy>()
                .map_err(anyhow::Error::msg)
                .context("SELECTION_POLICY is invalid")?,
            None => SelectionPolicy::default(),
        };

        let persist_table_summaries = match get("PERSIST_TABLE_SUMMARIES") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("PERSIST_TABLE_SUMMARIES must be a boolean, got '{raw}'"))?,
            None => false,
        };

        Ok(Config {
            document_intelligence_endpoint: get("DOCUMENT_INTELLIGENCE_ENDPOINT").unwrap_or_default(),
            document_intelligence_key: get("DOCUMENT_INTELLIGENCE_KEY").unwrap_or_default(),
            vision,
            openai,
            database_url: get("DATABASE_URL"),
            s3,
            selection_policy,
            persist_table_summaries,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Warns once per optional collaborator that is switched off.
    pub fn log_disabled_features(&self) {
        if self.vision.is_none() {
            warn!("Vision API not configured (VISION_API_ENDPOINT, VISION_API_KEY); visual cues disabled");
        }
        if self.openai.is_none() {
            warn!("Azure OpenAI not configured (AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_KEY, AZURE_OPENAI_DEPLOYMENT); LLM analysis disabled");
        }
        if self.database_url.is_none() {
            warn!("DATABASE_URL not set; document storage disabled");
        }
        if self.s3.is_none() {
            warn!("S3 not configured; blob processing disabled");
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
