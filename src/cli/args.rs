//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::model::SyncMode;
use crate::utils::time::parse_time_argument;

/// Parse a time argument for clap
fn time_arg(text: &str) -> Result<f64, String> {
    parse_time_argument(text).map_err(|e| e.to_string())
}

/// Which engine performs the trim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EngineKind {
    /// External ffmpeg invocation
    #[default]
    Tool,
    /// In-process frame capture of a `.y4m` source
    InProcess,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (seconds, MM:SS or HH:MM:SS.ms)
    #[arg(short, long, value_parser = time_arg)]
    pub start: f64,

    /// End time (seconds, MM:SS or HH:MM:SS.ms)
    #[arg(short, long, value_parser = time_arg)]
    pub end: f64,

    /// Name to store the clip under (default: trimmed_<millis>.mp4)
    #[arg(short, long)]
    pub output_name: Option<String>,

    /// Synchronization mode: reencode or copy (default from config)
    #[arg(long)]
    pub mode: Option<SyncMode>,

    /// Trim engine
    #[arg(long, value_enum, default_value_t = EngineKind::Tool)]
    pub engine: EngineKind,

    /// Known source duration in seconds (skips probing)
    #[arg(long)]
    pub duration: Option<f64>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (seconds, MM:SS or HH:MM:SS.ms)
    #[arg(short, long, value_parser = time_arg)]
    pub start: f64,

    /// End time (seconds, MM:SS or HH:MM:SS.ms)
    #[arg(short, long, value_parser = time_arg)]
    pub end: f64,

    /// Synchronization mode: reencode or copy (default from config)
    #[arg(long)]
    pub mode: Option<SyncMode>,

    /// Known source duration in seconds (skips probing)
    #[arg(long)]
    pub duration: Option<f64>,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Transcript file: a JSON segment list, or text with `[MM:SS-MM:SS]` ranges
    #[arg(short, long)]
    pub transcript: PathBuf,

    /// What to look for
    #[arg(short, long)]
    pub prompt: String,
}

/// Arguments for the transcribe command
#[derive(Args, Debug)]
pub struct TranscribeArgs {
    /// Media file to transcribe
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the serve-request command
#[derive(Args, Debug)]
pub struct ServeRequestArgs {
    /// Request JSON file, or `-` for stdin
    #[arg(short, long)]
    pub request: String,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Requested duration in seconds
    #[arg(long)]
    pub expected: f64,

    /// Produced duration in seconds
    #[arg(long)]
    pub actual: f64,

    /// Accepted error in seconds
    #[arg(long, default_value_t = crate::domain::rules::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}
