//! Local directory storage adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::domain::errors::*;
use crate::ports::*;

/// Copies artifacts into an output directory
pub struct LocalStorageAdapter {
    output_dir: PathBuf,
}

impl LocalStorageAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl StoragePort for LocalStorageAdapter {
    async fn store(&self, artifact: &Path, name: &str) -> Result<String, DomainError> {
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            DomainError::Upload(format!(
                "cannot create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let destination = self.output_dir.join(name);
        tokio::fs::copy(artifact, &destination).await.map_err(|e| {
            DomainError::Upload(format!("cannot write {}: {}", destination.display(), e))
        })?;

        info!("Stored {} at {}", name, destination.display());
        Ok(destination.to_string_lossy().to_string())
    }
}
