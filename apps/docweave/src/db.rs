use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `processed_documents` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed_documents (
            id                  TEXT PRIMARY KEY,
            timestamp           TIMESTAMPTZ NOT NULL,
            original_filename   TEXT NOT NULL,
            file_type           TEXT NOT NULL,
            processing_status   TEXT NOT NULL,
            content             JSONB NOT NULL,
            serialization_issue TEXT,
            last_updated        TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS processed_documents_filename_idx \
         ON processed_documents (original_filename)",
    )
    .execute(pool)
    .await?;

    info!("Table 'processed_documents' ready");
    Ok(())
}
