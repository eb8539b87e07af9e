// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for invoking the external media-processing tools.
///
/// Implementations must await the process to completion and report a
/// non-zero exit through [`ToolOutput`], not as an error. Errors are reserved
/// for failures to launch or communicate with the process.
#[async_trait]
pub trait MediaToolRunner: Send + Sync {
    async fn run(&self, tool: MediaTool, args: &[String]) -> Result<ToolOutput, DomainError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Frame rate of the first video stream, `None` when not discoverable
    async fn probe_frame_rate(&self, file_path: &Path) -> Result<Option<FrameRate>, DomainError>;

    /// Container duration in seconds, `None` when not discoverable
    async fn probe_duration(&self, file_path: &Path) -> Result<Option<f64>, DomainError>;
}

/// Port for durable storage of produced artifacts
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Transfer the artifact and return a durable reference (URL or path)
    async fn store(&self, artifact: &Path, name: &str) -> Result<String, DomainError>;
}

/// Port for the text-generation collaborator used by insight extraction
#[async_trait]
pub trait InsightPort: Send + Sync {
    /// Submit the rendered transcript and prompt, return the raw response text
    async fn generate(&self, transcript_text: &str, prompt: &str) -> Result<String, DomainError>;
}

/// Port for the speech-to-text collaborator
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    async fn transcribe(
        &self,
        media: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<TimedSegment>, DomainError>;
}
