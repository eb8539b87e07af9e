//! FFmpeg execution adapter
//!
//! Runs the external `ffmpeg`/`ffprobe` binaries as child processes.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Process-backed media tool runner
pub struct ProcessToolRunner {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl ProcessToolRunner {
    /// Runner resolving both tools from `PATH`
    pub fn new() -> Self {
        Self::with_paths("ffmpeg", "ffprobe")
    }

    pub fn with_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn program(&self, tool: MediaTool) -> &PathBuf {
        match tool {
            MediaTool::Ffmpeg => &self.ffmpeg,
            MediaTool::Ffprobe => &self.ffprobe,
        }
    }
}

impl Default for ProcessToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaToolRunner for ProcessToolRunner {
    async fn run(&self, tool: MediaTool, args: &[String]) -> Result<ToolOutput, DomainError> {
        let program = self.program(tool);
        debug!("Running {} ({} args)", tool, args.len());
        trace!("{} {}", program.display(), args.join(" "));

        // The child is killed if this future is dropped (e.g. on timeout)
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::io(format!("launching {}", program.display()), e))?;

        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!("{} exited with {:?}", tool, result.exit_code);
        Ok(result)
    }
}
