// Insight interactor - Transcription and insight extraction use cases

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::insights::SegmentExtractor;
use crate::ports::*;

/// Extraction request: segments or an already rendered transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptInput {
    Segments(Vec<TimedSegment>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub transcript: TranscriptInput,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub insights: Vec<TimedSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub segments: Vec<TimedSegment>,
}

/// Interactor for transcription and extraction.
///
/// Either collaborator may be absent when no credentials are configured;
/// the corresponding use case then fails with a configuration error.
pub struct InsightInteractor {
    extractor: Option<SegmentExtractor>,
    transcriber: Option<Arc<dyn TranscriptionPort>>,
}

impl InsightInteractor {
    pub fn new(
        generator: Option<Arc<dyn InsightPort>>,
        transcriber: Option<Arc<dyn TranscriptionPort>>,
    ) -> Self {
        Self {
            extractor: generator.map(SegmentExtractor::new),
            transcriber,
        }
    }

    fn extractor(&self) -> Result<&SegmentExtractor, DomainError> {
        self.extractor
            .as_ref()
            .ok_or_else(|| DomainError::Config("OpenAI API key not configured".to_string()))
    }

    /// Extract the segments relevant to the request prompt
    pub async fn extract(&self, request: ExtractRequest) -> Result<ExtractResponse, DomainError> {
        let extractor = self.extractor()?;
        let insights = match &request.transcript {
            TranscriptInput::Segments(segments) => {
                extractor.extract(segments, &request.prompt).await?
            }
            TranscriptInput::Text(text) => {
                extractor.extract_from_text(text, &request.prompt).await?
            }
        };
        info!("Extraction returned {} insights", insights.len());
        Ok(ExtractResponse { insights })
    }

    /// Transcribe a local media file
    pub async fn transcribe_file(&self, path: &Path) -> Result<TranscribeResponse, DomainError> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| DomainError::Config("OpenAI API key not configured".to_string()))?;

        let media = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::io(format!("reading {}", path.display()), e))?;
        if media.is_empty() {
            return Err(DomainError::BadArgs("No file provided".to_string()));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "media.mp4".to_string());

        let segments = transcriber.transcribe(media, &file_name).await?;
        Ok(TranscribeResponse { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_segments_or_text() {
        let request: ExtractRequest = serde_json::from_str(
            r#"{"transcript":[{"start":0,"end":4,"text":"intro"}],"prompt":"intro"}"#,
        )
        .unwrap();
        assert!(matches!(request.transcript, TranscriptInput::Segments(ref s) if s.len() == 1));

        let request: ExtractRequest =
            serde_json::from_str(r#"{"transcript":"[00:00-00:04] intro","prompt":"intro"}"#)
                .unwrap();
        assert!(matches!(request.transcript, TranscriptInput::Text(_)));
    }

    #[tokio::test]
    async fn test_missing_collaborators_are_config_errors() {
        let interactor = InsightInteractor::new(None, None);
        let request = ExtractRequest {
            transcript: TranscriptInput::Text(String::new()),
            prompt: "x".to_string(),
        };
        assert!(matches!(
            interactor.extract(request).await,
            Err(DomainError::Config(_))
        ));
        assert!(matches!(
            interactor.transcribe_file(Path::new("talk.mp4")).await,
            Err(DomainError::Config(_))
        ));
    }
}
