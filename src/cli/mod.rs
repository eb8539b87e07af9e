//! CLI module for clipsnip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{
    EngineKind, ExtractArgs, PlanArgs, ServeRequestArgs, TranscribeArgs, TrimArgs, ValidateArgs,
};

/// clipsnip - transcript-driven snippet extraction and video trimming
///
/// Trims clips with ffmpeg while keeping audio and video in sync, and picks
/// the transcript segments relevant to a prompt.
#[derive(Parser, Debug)]
#[command(name = "clipsnip")]
#[command(about = "Transcript-driven snippet extraction and sync-preserving video trimming")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: clipsnip.toml, config/clipsnip.toml)
    #[arg(long, global = true, env = "CLIPSNIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides config and environment)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim a segment out of a video file
    Trim(TrimArgs),
    /// Show the tool invocation a trim would run, without running it
    Plan(PlanArgs),
    /// Pick the transcript segments relevant to a prompt
    Extract(ExtractArgs),
    /// Transcribe a media file into timed segments
    Transcribe(TranscribeArgs),
    /// Handle one trim service request given as JSON
    ServeRequest(ServeRequestArgs),
    /// Check a produced duration against the requested one
    Validate(ValidateArgs),
}

impl Commands {
    /// Whether the command needs the configured adapters
    pub fn needs_container(&self) -> bool {
        !matches!(self, Commands::Validate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trim_command() {
        let cli = Cli::try_parse_from([
            "clipsnip", "trim", "--input", "talk.mp4", "--start", "1:05", "--end", "90.5",
            "--mode", "copy", "--engine", "in-process",
        ])
        .unwrap();

        match cli.command {
            Commands::Trim(args) => {
                assert_eq!(args.start, 65.0);
                assert_eq!(args.end, 90.5);
                assert_eq!(args.mode, Some(crate::domain::model::SyncMode::StreamCopy));
                assert_eq!(args.engine, EngineKind::InProcess);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "clipsnip", "validate", "--expected", "10", "--actual", "10.02", "--log-level",
            "debug", "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.json_logs);
        assert!(!cli.command.needs_container());
    }

    #[test]
    fn test_rejects_bad_time() {
        let parsed = Cli::try_parse_from([
            "clipsnip", "plan", "--input", "a.mp4", "--start", "1:75", "--end", "10",
        ]);
        assert!(parsed.is_err());
    }
}
