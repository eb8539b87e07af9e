// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::{EncoderSettings, FrameRate, SyncMode};
use crate::domain::rules::AccuracyValidator;

/// Config file locations tried when no explicit path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["clipsnip.toml", "config/clipsnip.toml"];

/// External tool locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Upper bound on one ffmpeg invocation; unbounded when absent
    pub timeout_secs: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            timeout_secs: None,
        }
    }
}

/// Trim behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub default_mode: SyncMode,
    /// Rate used when the source rate cannot be discovered
    pub default_frame_rate: String,
    /// Probe produced clips and check their duration before storing
    pub verify_output: bool,
    /// Accepted duration error in seconds
    pub tolerance: f64,
    /// Parent for per-request workspaces
    pub temp_dir: Option<PathBuf>,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            default_mode: SyncMode::ReEncode,
            default_frame_rate: "30".to_string(),
            verify_output: false,
            tolerance: crate::domain::rules::DEFAULT_TOLERANCE,
            temp_dir: None,
        }
    }
}

/// Durable storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Http,
}

impl std::str::FromStr for StorageBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "http" | "supabase" => Ok(StorageBackend::Http),
            other => Err(DomainError::Config(format!(
                "Invalid storage backend: {}. Valid backends: local, http",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Destination of the local backend
    pub output_dir: PathBuf,
    /// Object storage base URL (http backend)
    pub base_url: Option<String>,
    /// Service credential (http backend)
    pub service_key: Option<String>,
    pub bucket: String,
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            output_dir: PathBuf::from("output"),
            base_url: None,
            service_key: None,
            bucket: "video-processing".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Text-generation and transcription collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            transcription_model: "whisper-1".to_string(),
            temperature: 0.3,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub encoder: EncoderSettings,
    pub trim: TrimConfig,
    pub storage: StorageConfig,
    pub openai: OpenAiConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load from `path`, or from the first default location that exists.
    ///
    /// An explicit path must exist; with no file found, defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let candidate = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(DomainError::Config(format!(
                        "Config file does not exist: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists()),
        };

        match candidate {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    DomainError::Config(format!("Failed to read config file: {}", e))
                })?;
                Self::from_toml_str(&content)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<usize, DomainError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; returns how many keys were applied
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut applied = 0;

        if let Some(v) = get("CLIPSNIP_LOG_LEVEL") {
            self.logging.level = v;
            applied += 1;
        }
        if let Some(v) = get("CLIPSNIP_FFMPEG") {
            self.tools.ffmpeg = v;
            applied += 1;
        }
        if let Some(v) = get("CLIPSNIP_FFPROBE") {
            self.tools.ffprobe = v;
            applied += 1;
        }
        if let Some(v) = get("CLIPSNIP_OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(v);
            applied += 1;
        }
        if let Some(v) = get("CLIPSNIP_STORAGE_BACKEND") {
            self.storage.backend = v.parse()?;
            applied += 1;
        }
        if let Some(v) = get("CLIPSNIP_TOOL_TIMEOUT_SECS") {
            let secs = v.trim().parse::<u64>().map_err(|e| {
                DomainError::Config(format!("Invalid CLIPSNIP_TOOL_TIMEOUT_SECS '{}': {}", v, e))
            })?;
            self.tools.timeout_secs = Some(secs);
            applied += 1;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
            applied += 1;
        }
        if let Some(v) = get("SUPABASE_URL") {
            self.storage.base_url = Some(v);
            applied += 1;
        }
        if let Some(v) = get("SUPABASE_SERVICE_ROLE_KEY") {
            self.storage.service_key = Some(v);
            applied += 1;
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(applied)
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.encoder.crf > 51 {
            return Err(DomainError::Config(
                "CRF value cannot exceed 51".to_string(),
            ));
        }
        AccuracyValidator::new(self.trim.tolerance)?;
        self.default_frame_rate()?;
        crate::adapters::tracing_log::parse_level(&self.logging.level)?;

        if self.tools.timeout_secs == Some(0) {
            return Err(DomainError::Config(
                "tools.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Http {
            if self.storage.base_url.as_deref().map_or(true, str::is_empty) {
                return Err(DomainError::Config(
                    "http storage requires storage.base_url (or SUPABASE_URL)".to_string(),
                ));
            }
            if self.storage.service_key.as_deref().map_or(true, str::is_empty) {
                return Err(DomainError::Config(
                    "http storage requires storage.service_key (or SUPABASE_SERVICE_ROLE_KEY)"
                        .to_string(),
                ));
            }
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(DomainError::Config(format!(
                "openai.temperature must be in [0, 2], got {}",
                self.openai.temperature
            )));
        }
        Ok(())
    }

    pub fn default_frame_rate(&self) -> Result<FrameRate, DomainError> {
        FrameRate::parse(&self.trim.default_frame_rate).ok_or_else(|| {
            DomainError::Config(format!(
                "Invalid default frame rate: {}",
                self.trim.default_frame_rate
            ))
        })
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tools.timeout_secs.map(Duration::from_secs)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        toml::to_string_pretty(self)
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.encoder.crf, 23);
        assert_eq!(config.trim.default_mode, SyncMode::ReEncode);
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
        assert_eq!(config.default_frame_rate().unwrap(), FrameRate::DEFAULT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [encoder]
            preset = "slow"

            [trim]
            default_mode = "stream-copy"
            verify_output = true

            [storage]
            backend = "http"
            base_url = "https://example.supabase.co"
            service_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.encoder.preset, "slow");
        assert_eq!(config.encoder.crf, 23);
        assert_eq!(config.trim.default_mode, SyncMode::StreamCopy);
        assert!(config.trim.verify_output);
        assert_eq!(config.storage.backend, StorageBackend::Http);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLIPSNIP_FFMPEG", "/opt/ffmpeg"),
            ("CLIPSNIP_TOOL_TIMEOUT_SECS", "90"),
            ("CLIPSNIP_STORAGE_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
            ("OPENAI_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        let applied = config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(applied, 5);
        assert_eq!(config.tools.ffmpeg, "/opt/ffmpeg");
        assert_eq!(config.tool_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.storage.backend, StorageBackend::Http);
        assert_eq!(config.openai.api_key, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.encoder.crf = 60;
        assert!(matches!(config.validate(), Err(DomainError::Config(_))));

        let mut config = AppConfig::default();
        config.trim.default_frame_rate = "0/0".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Http;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        assert!(config
            .apply_env_from(|key| (key == "CLIPSNIP_TOOL_TIMEOUT_SECS").then(|| "soon".to_string()))
            .is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/clipsnip.toml")));
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipsnip.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "debug");

        let round_trip = AppConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }
}
