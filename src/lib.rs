//! clipsnip library
//!
//! Transcript-driven snippet extraction and sync-preserving video trimming.
//! The external media tools, storage and text collaborators sit behind the
//! traits in [`ports`]; [`app::DefaultAppContainer`] wires the production
//! adapters together.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod insights;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{SyncMode, TimedSegment, TrimRequest, TrimResult};
