//! Output naming utilities

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;

/// Extension used when the requested name carries none
const DEFAULT_EXTENSION: &str = "mp4";

/// Path utilities for durable output names
pub struct PathUtils;

impl PathUtils {
    /// Timestamp-based default name, e.g. `trimmed_1718000000123.mp4`
    pub fn default_output_name(now: DateTime<Utc>) -> String {
        Self::default_output_name_as(now, DEFAULT_EXTENSION)
    }

    pub fn default_output_name_as(now: DateTime<Utc>, extension: &str) -> String {
        format!("trimmed_{}.{}", now.timestamp_millis(), extension)
    }

    /// Resolve the durable output name for a request.
    ///
    /// Caller-provided names are reduced to a single safe path component so a
    /// request can never address files outside the storage root.
    pub fn resolve_output_name(
        requested: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        Self::resolve_output_name_as(requested, now, DEFAULT_EXTENSION)
    }

    /// [`resolve_output_name`](Self::resolve_output_name) with a different
    /// default extension
    pub fn resolve_output_name_as(
        requested: Option<&str>,
        now: DateTime<Utc>,
        extension: &str,
    ) -> Result<String, DomainError> {
        let requested = match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(Self::default_output_name_as(now, extension)),
        };

        let file_name = Path::new(requested)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                DomainError::BadArgs(format!("Invalid output filename: {}", requested))
            })?;

        let sanitized: String = file_name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let sanitized = sanitized.trim_start_matches('.').to_string();
        if sanitized.is_empty() {
            return Err(DomainError::BadArgs(format!(
                "Invalid output filename: {}",
                requested
            )));
        }

        if Path::new(&sanitized).extension().is_some() {
            Ok(sanitized)
        } else {
            Ok(format!("{}.{}", sanitized, extension))
        }
    }

    /// Media type for a file name, by extension
    pub fn mime_type(file_name: &str) -> &'static str {
        match Self::extension_of(file_name).as_deref() {
            Some("mp4") | Some("m4v") => "video/mp4",
            Some("mov") => "video/quicktime",
            Some("webm") => "video/webm",
            Some("mkv") => "video/x-matroska",
            Some("y4m") => "video/x-yuv4mpeg",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("wav") => "audio/wav",
            _ => "application/octet-stream",
        }
    }

    /// File extension of a source reference, lower-cased
    pub fn extension_of(source_ref: &str) -> Option<String> {
        Path::new(source_ref)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}
