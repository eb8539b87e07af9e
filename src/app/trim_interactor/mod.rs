// Trim interactor - Orchestrates the trim use cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::ServiceFailure;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::fallback::{FallbackTrimmer, Y4mSink, Y4mSource};
use crate::engine::{TrimExecutor, TrimWorkspace};
use crate::planner::TrimPlan;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Source name recorded for service uploads
const UPLOAD_SOURCE_REF: &str = "upload.mp4";

/// Trim request as received at the service boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimServiceRequest {
    /// Base64-encoded source media
    #[serde(alias = "videoFile")]
    pub video_bytes: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub output_filename: Option<String>,
    pub mode: Option<SyncMode>,
}

/// Successful trim payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimServiceSuccess {
    pub success: bool,
    pub trimmed_video_url: String,
    pub filename: String,
    pub duration: f64,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_duration: Option<f64>,
}

/// Service boundary response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrimServiceResponse {
    Success(TrimServiceSuccess),
    Failure(ServiceFailure),
}

impl TrimServiceResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            TrimServiceResponse::Success(_) => 200,
            TrimServiceResponse::Failure(failure) => failure.status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TrimServiceResponse::Success(_))
    }
}

impl From<TrimResult> for TrimServiceSuccess {
    fn from(result: TrimResult) -> Self {
        Self {
            success: true,
            trimmed_video_url: result.output_ref,
            filename: result.filename,
            duration: result.actual_duration,
            start_time: result.start_time,
            end_time: result.end_time,
            measured_duration: result.measured_duration,
        }
    }
}

/// Options for trimming a local file
#[derive(Debug, Clone, Default)]
pub struct TrimFileOptions {
    pub output_name: Option<String>,
    pub mode: Option<SyncMode>,
    /// Known source duration; probed when absent
    pub source_duration: Option<f64>,
}

/// Interactor for the trim use cases
pub struct TrimInteractor {
    executor: TrimExecutor,
    probe: Arc<dyn ProbePort>,
    storage: Arc<dyn StoragePort>,
    default_mode: SyncMode,
    temp_root: Option<PathBuf>,
}

impl TrimInteractor {
    pub fn new(
        executor: TrimExecutor,
        probe: Arc<dyn ProbePort>,
        storage: Arc<dyn StoragePort>,
        default_mode: SyncMode,
        temp_root: Option<PathBuf>,
    ) -> Self {
        Self {
            executor,
            probe,
            storage,
            default_mode,
            temp_root,
        }
    }

    /// Handle one service request; failures become a failure payload
    pub async fn handle(&self, request: TrimServiceRequest) -> TrimServiceResponse {
        match self.process(request).await {
            Ok(result) => TrimServiceResponse::Success(result.into()),
            Err(e) => {
                warn!("Trim request failed ({}): {}", e.status_code(), e);
                TrimServiceResponse::Failure(ServiceFailure::from(&e))
            }
        }
    }

    /// Validate, decode and execute one service request
    pub async fn process(&self, request: TrimServiceRequest) -> Result<TrimResult, DomainError> {
        let (encoded, start, end) = match (request.video_bytes, request.start_time, request.end_time)
        {
            (Some(encoded), Some(start), Some(end)) if !encoded.trim().is_empty() => {
                (encoded, start, end)
            }
            _ => {
                return Err(DomainError::BadArgs(
                    "Missing required parameters: videoFile, startTime, endTime".to_string(),
                ))
            }
        };

        info!("Trimming video from {}s to {}s", start, end);
        let bytes = decode_video(&encoded)?;

        let mut trim = TrimRequest::new(UPLOAD_SOURCE_REF, start, end)
            .with_mode(request.mode.unwrap_or(self.default_mode));
        if let Some(name) = request.output_filename {
            trim = trim.with_output_name(name);
        }
        self.executor.execute(&trim, &bytes).await
    }

    /// Trim a local media file with the external tool
    pub async fn trim_file(
        &self,
        path: &Path,
        start: f64,
        end: f64,
        options: TrimFileOptions,
    ) -> Result<TrimResult, DomainError> {
        let source_duration = self.source_duration(path, options.source_duration).await;
        let mut request = TrimRequest::new(path.to_string_lossy(), start, end)
            .with_mode(options.mode.unwrap_or(self.default_mode));
        if let Some(duration) = source_duration {
            request = request.with_source_duration(duration);
        }
        if let Some(name) = options.output_name {
            request = request.with_output_name(name);
        }

        // Reject bad bounds before reading the whole source
        crate::planner::TrimPlanner::check_range(
            request.source_duration,
            request.start_time,
            request.end_time,
        )?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::io(format!("reading {}", path.display()), e))?;
        self.executor.execute(&request, &bytes).await
    }

    /// Plan a trim of a local file without running it.
    ///
    /// Returns the plan and the tool arguments it would run with.
    pub async fn plan_file(
        &self,
        path: &Path,
        start: f64,
        end: f64,
        mode: Option<SyncMode>,
        source_duration: Option<f64>,
    ) -> Result<(TrimPlan, Vec<String>), DomainError> {
        let source_duration = self.source_duration(path, source_duration).await;
        let plan = self
            .executor
            .planner()
            .plan(path, source_duration, start, end, mode.unwrap_or(self.default_mode))
            .await?;
        let args = plan.tool_args(path, Path::new("output.mp4"));
        Ok((plan, args))
    }

    /// Trim a `.y4m` file in-process, without the external tool.
    ///
    /// Setting `cancel` stops the capture and discards the partial output.
    pub async fn trim_in_process(
        &self,
        path: &Path,
        start: f64,
        end: f64,
        output_name: Option<&str>,
        cancel: watch::Receiver<bool>,
    ) -> Result<TrimResult, DomainError> {
        let output_name = PathUtils::resolve_output_name_as(output_name, Utc::now(), "y4m")?;
        let source = Y4mSource::read(path).await?;
        let workspace =
            TrimWorkspace::create(self.temp_root.as_deref(), Some("y4m"), Some("y4m"))?;

        info!("Trimming {} in-process: {}s - {}s", path.display(), start, end);
        let trimmer = FallbackTrimmer::new(
            source,
            Y4mSink::create(workspace.output_path()),
            start,
            end,
        )?;

        let outcome = match trimmer.run(cancel).await {
            Ok(artifact) => self
                .storage
                .store(&artifact, &output_name)
                .await
                .map_err(|e| match e {
                    DomainError::Upload(_) => e,
                    other => DomainError::Upload(other.to_string()),
                }),
            Err(e) => Err(e),
        };
        workspace.close();

        let output_ref = outcome?;
        Ok(TrimResult {
            output_ref,
            filename: output_name,
            actual_duration: end - start,
            start_time: start,
            end_time: end,
            mode: SyncMode::ReEncode,
            measured_duration: None,
        })
    }

    async fn source_duration(&self, path: &Path, known: Option<f64>) -> Option<f64> {
        if known.is_some() {
            return known;
        }
        match self.probe.probe_duration(path).await {
            Ok(duration) => duration,
            Err(e) => {
                warn!("Could not probe duration of {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Decode base64 media, tolerating a `data:` URL prefix and line breaks
pub fn decode_video(encoded: &str) -> Result<Vec<u8>, DomainError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DomainError::BadArgs(format!("videoFile is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(DomainError::BadArgs("videoFile is empty".to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_video() {
        assert_eq!(decode_video("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_video("aGVs\nbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_video("data:video/mp4;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(decode_video("not base64!"), Err(DomainError::BadArgs(_))));
    }

    #[test]
    fn test_request_accepts_both_field_names() {
        let request: TrimServiceRequest = serde_json::from_str(
            r#"{"videoFile":"aGVsbG8=","startTime":1.5,"endTime":4,"outputFilename":"a.mp4"}"#,
        )
        .unwrap();
        assert_eq!(request.video_bytes.as_deref(), Some("aGVsbG8="));
        assert_eq!(request.end_time, Some(4.0));

        let request: TrimServiceRequest =
            serde_json::from_str(r#"{"videoBytes":"aGVsbG8=","startTime":0,"endTime":1,"mode":"stream-copy"}"#)
                .unwrap();
        assert_eq!(request.mode, Some(SyncMode::StreamCopy));
    }

    #[test]
    fn test_success_payload_shape() {
        let success = TrimServiceSuccess::from(TrimResult {
            output_ref: "https://cdn/clip.mp4".to_string(),
            filename: "clip.mp4".to_string(),
            actual_duration: 10.0,
            start_time: 5.0,
            end_time: 15.0,
            mode: SyncMode::ReEncode,
            measured_duration: None,
        });
        let json = serde_json::to_value(TrimServiceResponse::Success(success)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "trimmedVideoUrl": "https://cdn/clip.mp4",
                "filename": "clip.mp4",
                "duration": 10.0,
                "startTime": 5.0,
                "endTime": 15.0
            })
        );
    }
}
