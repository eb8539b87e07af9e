//! Per-request temporary workspace

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use crate::domain::errors::DomainError;

const WORKSPACE_PREFIX: &str = "clipsnip-";
const DEFAULT_EXTENSION: &str = "mp4";

/// Scoped directory holding one request's temporary input and output.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, whichever way the request ends.
pub struct TrimWorkspace {
    dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl TrimWorkspace {
    /// Create a fresh workspace, under `root` when given.
    ///
    /// The extensions keep the source container hint visible to the tool and
    /// select the output container; unsafe or missing ones become `mp4`.
    pub fn create(
        root: Option<&Path>,
        input_extension: Option<&str>,
        output_extension: Option<&str>,
    ) -> Result<Self, DomainError> {
        let mut builder = Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| DomainError::io("creating temporary workspace", e))?;

        let input = dir.path().join(format!("input.{}", safe_extension(input_extension)));
        let output = dir.path().join(format!("output.{}", safe_extension(output_extension)));

        debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir, input, output })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Write the source bytes to the temporary input
    pub async fn stage_input(&self, bytes: &[u8]) -> Result<(), DomainError> {
        tokio::fs::write(&self.input, bytes)
            .await
            .map_err(|e| DomainError::io("writing temporary input", e))
    }

    /// Remove the workspace now; failures are logged, never raised
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed workspace {}", path.display()),
            Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}

fn safe_extension(extension: Option<&str>) -> &str {
    extension
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_EXTENSION)
}
