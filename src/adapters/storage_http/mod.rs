//! Object storage adapter speaking the Supabase storage REST protocol

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Uploads artifacts to a storage bucket and returns their public URL
pub struct HttpStorageAdapter {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl HttpStorageAdapter {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        })
    }

    /// Upload endpoint for an object
    pub fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name)
    }

    /// Publicly readable URL for an object
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }
}

#[async_trait]
impl StoragePort for HttpStorageAdapter {
    async fn store(&self, artifact: &Path, name: &str) -> Result<String, DomainError> {
        let body = tokio::fs::read(artifact).await.map_err(|e| {
            DomainError::Upload(format!("cannot read {}: {}", artifact.display(), e))
        })?;
        debug!("Uploading {} bytes to bucket {}", body.len(), self.bucket);

        let response = self
            .client
            .post(self.object_url(name))
            .bearer_auth(&self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, PathUtils::mime_type(name))
            .body(body)
            .send()
            .await
            .map_err(|e| DomainError::Upload(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::Upload(format!(
                "Failed to upload trimmed video ({}): {}",
                status,
                detail.trim()
            )));
        }

        let url = self.public_url(name);
        info!("Uploaded {} to {}", name, url);
        Ok(url)
    }
}
