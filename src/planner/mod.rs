//! Trim strategy planning module

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::model::{EncoderSettings, FrameRate, SyncMode};
use crate::engine::{copy, reencode};

pub mod strategy;

pub use strategy::TrimPlanner;

/// Selected trim strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TrimStrategy {
    /// Lossless stream copy (fast, may snap to a keyframe)
    StreamCopy,
    /// Full re-encode with timestamp resets (frame-accurate)
    ReEncode {
        /// Rate pinned on output
        frame_rate: FrameRate,
    },
}

impl TrimStrategy {
    pub fn mode(&self) -> SyncMode {
        match self {
            TrimStrategy::StreamCopy => SyncMode::StreamCopy,
            TrimStrategy::ReEncode { .. } => SyncMode::ReEncode,
        }
    }
}

/// Fully resolved trim parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimPlan {
    /// Seek position in seconds
    pub start: f64,
    /// Requested end in seconds
    pub end: f64,
    /// `end - start`
    pub duration: f64,
    pub strategy: TrimStrategy,
    pub encoder: EncoderSettings,
}

impl TrimPlan {
    /// Frame rate pinned on output, if the strategy re-encodes
    pub fn frame_rate(&self) -> Option<FrameRate> {
        match self.strategy {
            TrimStrategy::ReEncode { frame_rate } => Some(frame_rate),
            TrimStrategy::StreamCopy => None,
        }
    }

    /// Media tool argument list for this plan
    pub fn tool_args(&self, input: &Path, output: &Path) -> Vec<String> {
        match self.strategy {
            TrimStrategy::StreamCopy => copy::build_args(self, input, output),
            TrimStrategy::ReEncode { frame_rate } => {
                reencode::build_args(self, frame_rate, input, output)
            }
        }
    }
}
