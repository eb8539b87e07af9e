// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed timestamp text
    #[error("Invalid timestamp '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Text-generation collaborator failure
    #[error("Insight extraction failed: {0}")]
    Extraction(String),

    /// Transcription collaborator failure
    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// Invalid trim bounds
    #[error("Invalid time range: {0}")]
    Range(String),

    /// Media tool exited unsuccessfully, or was cancelled
    #[error("Media tool failed (exit code {code:?}): {diagnostic}")]
    Tool {
        code: Option<i32>,
        diagnostic: String,
    },

    /// Temporary file or process I/O failure
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Durable storage transfer failure
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Fallback trimmer could not decode the source
    #[error("Decode error: {0}")]
    Decode(String),

    /// Fallback trimmer could not capture or assemble the output
    #[error("Capture error: {0}")]
    Capture(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request shape
    #[error("Bad arguments: {0}")]
    BadArgs(String),
}

impl DomainError {
    /// Wrap an I/O error with the operation that produced it
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DomainError::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable label used in service responses
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Parse { .. } => "parse_error",
            DomainError::Extraction(_) => "extraction_error",
            DomainError::Transcription(_) => "transcription_error",
            DomainError::Range(_) => "range_error",
            DomainError::Tool { .. } => "tool_error",
            DomainError::Io { .. } => "io_error",
            DomainError::Upload(_) => "upload_error",
            DomainError::Decode(_) => "decode_error",
            DomainError::Capture(_) => "capture_error",
            DomainError::Config(_) => "config_error",
            DomainError::BadArgs(_) => "bad_request",
        }
    }

    /// HTTP-equivalent status code for the service boundary
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Parse { .. } | DomainError::Range(_) | DomainError::BadArgs(_) => 400,
            _ => 500,
        }
    }
}
