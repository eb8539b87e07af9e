//! OpenAI-compatible speech-to-text adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::adapters::insight_openai::api_error_message;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// End used for the single fallback segment when no duration is reported
const FALLBACK_SEGMENT_END: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionResponse {
    #[serde(default)]
    pub text: String,
    pub duration: Option<f64>,
    pub segments: Option<Vec<ResponseSegment>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

/// Convert a verbose transcription response into segments.
///
/// Without segment data the whole text becomes one segment spanning the
/// reported duration. Segments with invalid bounds are dropped.
pub fn segments_from_response(response: TranscriptionResponse) -> Vec<TimedSegment> {
    match response.segments {
        Some(segments) if !segments.is_empty() => segments
            .into_iter()
            .filter_map(|raw| {
                match TimedSegment::new(raw.start, raw.end, raw.text.trim()) {
                    Ok(segment) => Some(segment),
                    Err(e) => {
                        warn!("Dropping transcription segment: {}", e);
                        None
                    }
                }
            })
            .collect(),
        _ => {
            let end = response
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(FALLBACK_SEGMENT_END);
            TimedSegment::new(0.0, end, response.text.trim())
                .map(|segment| vec![segment])
                .unwrap_or_default()
        }
    }
}

/// Whisper transcription client
pub struct WhisperTranscriptionAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl WhisperTranscriptionAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl TranscriptionPort for WhisperTranscriptionAdapter {
    async fn transcribe(
        &self,
        media: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<TimedSegment>, DomainError> {
        info!("Transcribing {} ({} bytes) with {}", file_name, media.len(), self.model);

        let part = reqwest::multipart::Part::bytes(media)
            .file_name(file_name.to_string())
            .mime_str(PathUtils::mime_type(file_name))
            .map_err(|e| DomainError::Transcription(format!("invalid media type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Transcription(api_error_message(
                &body,
                "Failed to transcribe video",
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Transcription(format!("invalid response: {}", e)))?;
        let segments = segments_from_response(parsed);
        info!("Transcription produced {} segments", segments.len());
        Ok(segments)
    }
}
