use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

/// Reads source documents that were uploaded to object storage (S3 or MinIO).
#[derive(Clone)]
pub struct BlobSource {
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl BlobSource {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { s3, bucket }
    }

    pub async fn fetch(&self, key: &str) -> Result<Bytes, AppError> {
        let object = self
            .s3
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Blob(format!("get_object s3://{}/{key} failed: {e}", self.bucket)))?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Blob(format!("reading s3://{}/{key} failed: {e}", self.bucket)))?
            .into_bytes();

        info!("Fetched {} bytes from s3://{}/{}", body.len(), self.bucket, key);
        Ok(body)
    }
}

/// The filename of a blob key: its last path segment.
pub fn filename_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
