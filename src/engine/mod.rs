//! Core trimming engine module

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod copy;
pub mod executor;
pub mod fallback;
pub mod reencode;
pub mod workspace;

pub use executor::TrimExecutor;
pub use workspace::TrimWorkspace;

/// Executor configuration
#[derive(Debug, Clone, Default)]
pub struct ExecutorSettings {
    /// Parent directory for per-request workspaces (system temp dir when unset)
    pub temp_root: Option<PathBuf>,
    /// Upper bound on a single media tool invocation
    pub tool_timeout: Option<Duration>,
}

/// Trimming phases, reported through tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimPhase {
    /// Writing the source to the workspace
    Staging,
    /// Choosing strategy parameters
    Planning,
    /// Running the media tool
    Trimming,
    /// Probing the produced artifact
    Verifying,
    /// Transferring to durable storage
    Storing,
    /// Completed
    Completed,
}

impl std::fmt::Display for TrimPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrimPhase::Staging => "staging",
            TrimPhase::Planning => "planning",
            TrimPhase::Trimming => "trimming",
            TrimPhase::Verifying => "verifying",
            TrimPhase::Storing => "storing",
            TrimPhase::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}
