// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod insight_openai;
pub mod probe_ffprobe;
pub mod storage_http;
pub mod storage_local;
pub mod toml_config;
pub mod tracing_log;
pub mod transcribe_whisper;

// Re-export adapters
pub use exec_ffmpeg::ProcessToolRunner;
pub use insight_openai::OpenAiInsightAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use storage_http::HttpStorageAdapter;
pub use storage_local::LocalStorageAdapter;
pub use toml_config::AppConfig;
pub use transcribe_whisper::WhisperTranscriptionAdapter;
