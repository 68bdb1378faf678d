//! Object-storage HTTP client.
//!
//! Uploads processed images to the hosted storage service. Uploads are
//! idempotent overwrites (last write wins). When the target bucket does not
//! exist the client creates it (public, size-capped) and retries once; if
//! creation also fails it falls back to a hardcoded alternate bucket.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use crate::config::StorageConfig;

/// Alternate bucket used when the configured bucket cannot be created.
const FALLBACK_BUCKET: &str = "images";

/// Size cap applied when creating a bucket (50 MB, matching the per-image
/// download bound).
const BUCKET_FILE_SIZE_LIMIT: u64 = 50 * 1024 * 1024;

/// Errors that can occur talking to the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Transport-level failure.
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The target bucket does not exist.
    #[error("bucket not found: {0}")]
    BucketMissing(String),

    /// The service refused the request.
    #[error("storage service rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
    },
}

/// Object-storage API client.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: config.base_url.clone(),
                service_key: config.service_key.clone(),
                bucket: config.bucket.clone(),
            }),
        }
    }

    /// Upload an object and return its public URL.
    ///
    /// Tries the configured bucket first. A missing bucket triggers one
    /// create-and-retry; if bucket creation fails too, the upload lands in
    /// the fallback bucket.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if every attempt is refused.
    #[instrument(skip(self, bytes), fields(name = %name, size = bytes.len()))]
    pub async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let bucket = self.inner.bucket.clone();

        match self.put_object(&bucket, name, bytes.clone(), content_type).await {
            Ok(()) => Ok(self.public_url(&bucket, name)),
            Err(StorageError::BucketMissing(_)) => {
                tracing::warn!(bucket = %bucket, "upload bucket missing, attempting to create");
                if self.create_bucket(&bucket).await.is_ok() {
                    self.put_object(&bucket, name, bytes, content_type).await?;
                    Ok(self.public_url(&bucket, name))
                } else {
                    tracing::warn!(
                        bucket = %bucket,
                        fallback = FALLBACK_BUCKET,
                        "bucket creation failed, using fallback bucket"
                    );
                    self.put_object(FALLBACK_BUCKET, name, bytes, content_type)
                        .await?;
                    Ok(self.public_url(FALLBACK_BUCKET, name))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Public URL for an uploaded object.
    #[must_use]
    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{name}",
            self.inner.base_url
        )
    }

    /// Write one object, overwriting any previous version.
    async fn put_object(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/object/{bucket}/{name}", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.service_key.expose_secret())
            .header("content-type", content_type)
            .header("cache-control", "3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND || message.contains("Bucket not found") {
            return Err(StorageError::BucketMissing(bucket.to_owned()));
        }

        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Create a public, size-capped bucket.
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/bucket", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.service_key.expose_secret())
            .json(&serde_json::json!({
                "id": bucket,
                "name": bucket,
                "public": true,
                "file_size_limit": BUCKET_FILE_SIZE_LIMIT,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(StorageError::Rejected {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_public_url_shape() {
        let client = StorageClient::new(&StorageConfig {
            base_url: "https://storage.test".to_string(),
            service_key: SecretString::from("service-key"),
            bucket: "experiences".to_string(),
        });

        assert_eq!(
            client.public_url("experiences", "experience-1-0-123.jpg"),
            "https://storage.test/storage/v1/object/public/experiences/experience-1-0-123.jpg"
        );
    }
}
