mod analysis;
mod config;
mod cues;
mod db;
mod display;
mod errors;
mod interpret;
mod layout;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{DocumentAnalyzer, DocumentIntelligenceClient, ImageAnalyzer, VisionClient};
use crate::config::{Config, S3Config};
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{ContentAnalyzer, LlmClient};
use crate::pipeline::PipelineContext;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{BlobSource, DocumentStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing document-analysis credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docweave v{}", env!("CARGO_PKG_VERSION"));
    config.log_disabled_features();

    // Document analysis is the only mandatory collaborator
    let documents: Arc<dyn DocumentAnalyzer> = Arc::new(DocumentIntelligenceClient::new(
        config.document_intelligence_endpoint.clone(),
        config.document_intelligence_key.clone(),
    )?);
    info!("Document Intelligence client initialized");

    let vision: Option<Arc<dyn ImageAnalyzer>> = match &config.vision {
        Some(vision) => {
            let client = VisionClient::new(
                vision.endpoint.clone(),
                vision.key.clone(),
                vision.api_version.clone(),
            )?;
            info!("Vision client initialized (api version: {})", vision.api_version);
            Some(Arc::new(client))
        }
        None => None,
    };

    let llm: Option<Arc<dyn ContentAnalyzer>> = match &config.openai {
        Some(openai) => {
            let client = LlmClient::new(
                openai.endpoint.clone(),
                openai.key.clone(),
                openai.deployment.clone(),
                openai.api_version.clone(),
            )?;
            info!("LLM client initialized (deployment: {})", client.deployment());
            Some(Arc::new(client))
        }
        None => None,
    };

    // Storage failures at startup disable storage instead of aborting
    let store: Option<Arc<dyn DocumentStore>> = match &config.database_url {
        Some(url) => match connect_store(url).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("Document storage unavailable (continuing without it): {e:#}");
                None
            }
        },
        None => None,
    };

    let blobs = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 client initialized (bucket: {})", s3.bucket);
            Some(BlobSource::new(client, s3.bucket.clone()))
        }
        None => None,
    };

    let state = AppState {
        pipeline: PipelineContext {
            documents,
            vision,
            llm,
            store,
            selection_policy: config.selection_policy,
            persist_table_summaries: config.persist_table_summaries,
        },
        blobs,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(database_url: &str) -> Result<PgDocumentStore> {
    let pool = create_pool(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(PgDocumentStore::new(pool))
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "docweave-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
