//! FFprobe adapter for media file probing

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    runner: Arc<dyn MediaToolRunner>,
}

impl FfprobeAdapter {
    pub fn new(runner: Arc<dyn MediaToolRunner>) -> Self {
        Self { runner }
    }

    async fn query(&self, args: Vec<String>) -> Result<Option<String>, DomainError> {
        let output = self.runner.run(MediaTool::Ffprobe, &args).await?;
        if !output.success() {
            return Err(DomainError::Tool {
                code: output.exit_code,
                diagnostic: output.stderr.trim().to_string(),
            });
        }
        let value = output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        Ok(value)
    }
}

/// Arguments reporting the first video stream's frame rate as `num/den`
pub fn frame_rate_args(file_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "0".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=r_frame_rate".to_string(),
        file_path.to_string_lossy().to_string(),
    ]
}

/// Arguments reporting the container duration in seconds
pub fn duration_args(file_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        file_path.to_string_lossy().to_string(),
    ]
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_frame_rate(&self, file_path: &Path) -> Result<Option<FrameRate>, DomainError> {
        let raw = self.query(frame_rate_args(file_path)).await?;
        debug!("ffprobe r_frame_rate: {:?}", raw);
        // `0/0` and garbage both come back as None
        Ok(raw
            .as_deref()
            .map(|line| line.trim_end_matches(','))
            .and_then(FrameRate::parse))
    }

    async fn probe_duration(&self, file_path: &Path) -> Result<Option<f64>, DomainError> {
        let raw = self.query(duration_args(file_path)).await?;
        debug!("ffprobe duration: {:?}", raw);
        Ok(raw
            .and_then(|line| line.trim_end_matches(',').parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedRunner {
        output: ToolOutput,
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl CannedRunner {
        fn new(exit_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
            Arc::new(Self {
                output: ToolOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MediaToolRunner for CannedRunner {
        async fn run(&self, tool: MediaTool, args: &[String]) -> Result<ToolOutput, DomainError> {
            assert_eq!(tool, MediaTool::Ffprobe);
            self.seen.lock().unwrap().push(args.to_vec());
            Ok(self.output.clone())
        }
    }

    #[tokio::test]
    async fn test_frame_rate_parsed() {
        let runner = CannedRunner::new(0, "30000/1001\n", "");
        let probe = FfprobeAdapter::new(runner.clone());
        let rate = probe.probe_frame_rate(Path::new("in.mp4")).await.unwrap();

        assert_eq!(rate, Some(FrameRate::new(30000, 1001).unwrap()));
        assert_eq!(runner.seen.lock().unwrap()[0], frame_rate_args(Path::new("in.mp4")));
    }

    #[tokio::test]
    async fn test_degenerate_frame_rate_is_none() {
        let probe = FfprobeAdapter::new(CannedRunner::new(0, "0/0\n", ""));
        assert_eq!(probe.probe_frame_rate(Path::new("in.mp4")).await.unwrap(), None);

        let probe = FfprobeAdapter::new(CannedRunner::new(0, "", ""));
        assert_eq!(probe.probe_frame_rate(Path::new("in.mp4")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_probe_failure_is_tool_error() {
        let probe = FfprobeAdapter::new(CannedRunner::new(1, "", "in.mp4: Invalid data\n"));
        let err = probe.probe_duration(Path::new("in.mp4")).await.unwrap_err();
        match err {
            DomainError::Tool { code, diagnostic } => {
                assert_eq!(code, Some(1));
                assert_eq!(diagnostic, "in.mp4: Invalid data");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duration_parsed() {
        let probe = FfprobeAdapter::new(CannedRunner::new(0, "80.040000\n", ""));
        assert_eq!(
            probe.probe_duration(Path::new("in.mp4")).await.unwrap(),
            Some(80.04)
        );

        let probe = FfprobeAdapter::new(CannedRunner::new(0, "N/A\n", ""));
        assert_eq!(probe.probe_duration(Path::new("in.mp4")).await.unwrap(), None);
    }
}
