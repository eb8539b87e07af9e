// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::utils::time::format_mm_ss;

/// A time-bounded span of transcribed or extracted content.
///
/// Segments are immutable once constructed; filtering and extraction produce
/// new sequences instead of editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct TimedSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Unvalidated wire form of a segment
#[derive(Debug, Deserialize)]
struct RawSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

impl TryFrom<RawSegment> for TimedSegment {
    type Error = DomainError;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        TimedSegment::new(raw.start, raw.end, raw.text)
    }
}

impl TimedSegment {
    /// Create a new segment with validation
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::BadArgs(
                "Segment bounds must be finite numbers".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Segment start cannot be negative: {}",
                start
            )));
        }
        if end <= start {
            return Err(DomainError::BadArgs(format!(
                "Segment end ({}) must be greater than start ({})",
                end, start
            )));
        }

        Ok(Self {
            start,
            end,
            text: text.into(),
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Render as a `[MM:SS-MM:SS] text` transcript line
    pub fn to_transcript_line(&self) -> String {
        format!(
            "[{}-{}] {}",
            format_mm_ss(self.start),
            format_mm_ss(self.end),
            self.text
        )
    }
}

/// Rational frame rate discovered from a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Used whenever discovery fails or reports a degenerate rate
    pub const DEFAULT: FrameRate = FrameRate { num: 30, den: 1 };

    /// Create a new frame rate, rejecting zero components
    pub fn new(num: u32, den: u32) -> Result<Self, DomainError> {
        if num == 0 || den == 0 {
            return Err(DomainError::BadArgs(format!(
                "Degenerate frame rate {}/{}",
                num, den
            )));
        }
        Ok(Self { num, den })
    }

    /// Parse ffprobe-style `num/den` or a bare integer rate.
    ///
    /// Returns `None` for unparseable or degenerate (`0/0`) values.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let (num, den) = match trimmed.split_once('/') {
            Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
            None => (trimmed.parse().ok()?, 1),
        };
        Self::new(num, den).ok()
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Seconds between two consecutive frames
    pub fn frame_duration(&self) -> f64 {
        self.den as f64 / self.num as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Requested synchronization strategy for a trim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Repackage the bitstream without decoding (fast, keyframe-imprecise)
    StreamCopy,
    /// Decode and re-encode with timestamp resets (frame-accurate)
    #[default]
    ReEncode,
}

impl FromStr for SyncMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" | "stream-copy" | "streamcopy" => Ok(SyncMode::StreamCopy),
            "reencode" | "re-encode" => Ok(SyncMode::ReEncode),
            other => Err(DomainError::BadArgs(format!(
                "Invalid sync mode: {}. Valid modes: copy, reencode",
                other
            ))),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::StreamCopy => write!(f, "stream-copy"),
            SyncMode::ReEncode => write!(f, "re-encode"),
        }
    }
}

/// A request to trim one source clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimRequest {
    /// Where the source came from (path, upload name)
    pub source_ref: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Durable output name; a timestamp-based default is used when absent
    pub output_name: Option<String>,
    /// Source duration in seconds, when known
    pub source_duration: Option<f64>,
    pub mode: SyncMode,
}

impl TrimRequest {
    /// Create a new trim request using the default re-encode mode
    pub fn new(source_ref: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            source_ref: source_ref.into(),
            start_time,
            end_time,
            output_name: None,
            source_duration: None,
            mode: SyncMode::default(),
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn with_source_duration(mut self, duration: f64) -> Self {
        self.source_duration = Some(duration);
        self
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Requested clip length
    pub fn requested_duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Outcome of an accepted trim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimResult {
    /// Durable reference (URL or local path)
    pub output_ref: String,
    /// Name the artifact was stored under
    pub filename: String,
    pub actual_duration: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub mode: SyncMode,
    /// Duration probed from the produced artifact, when verification ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_duration: Option<f64>,
}

/// External media tools the core orchestrates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTool {
    Ffmpeg,
    Ffprobe,
}

impl fmt::Display for MediaTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTool::Ffmpeg => write!(f, "ffmpeg"),
            MediaTool::Ffprobe => write!(f, "ffprobe"),
        }
    }
}

/// Captured result of one tool invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Encoder parameters for the re-encode strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub preset: String,
    /// Constant Rate Factor (0-51)
    pub crf: u8,
    pub audio_codec: String,
    /// Move the moov atom to the front for progressive playback
    pub faststart: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            faststart: true,
        }
    }
}
