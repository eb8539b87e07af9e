use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::adapters::toml_config::StorageBackend;
use crate::adapters::{
    AppConfig, FfprobeAdapter, HttpStorageAdapter, LocalStorageAdapter, OpenAiInsightAdapter,
    ProcessToolRunner, WhisperTranscriptionAdapter,
};
use crate::app::{insight_interactor::InsightInteractor, trim_interactor::TrimInteractor};
use crate::domain::errors::DomainError;
use crate::domain::rules::AccuracyValidator;
use crate::engine::{ExecutorSettings, TrimExecutor};
use crate::output::OutputVerifier;
use crate::planner::TrimPlanner;
use crate::ports::{InsightPort, MediaToolRunner, ProbePort, StoragePort, TranscriptionPort};

pub trait AppContainer: Send + Sync {
    fn trim_interactor(&self) -> Arc<TrimInteractor>;
    fn insight_interactor(&self) -> Arc<InsightInteractor>;
}

/// Collaborators the container wires together
pub struct Ports {
    pub runner: Arc<dyn MediaToolRunner>,
    pub probe: Arc<dyn ProbePort>,
    pub storage: Arc<dyn StoragePort>,
    pub insight: Option<Arc<dyn InsightPort>>,
    pub transcriber: Option<Arc<dyn TranscriptionPort>>,
}

pub struct DefaultAppContainer {
    trim_interactor: Arc<TrimInteractor>,
    insight_interactor: Arc<InsightInteractor>,
}

impl DefaultAppContainer {
    /// Build production adapters from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let runner: Arc<dyn MediaToolRunner> = Arc::new(ProcessToolRunner::with_paths(
            &config.tools.ffmpeg,
            &config.tools.ffprobe,
        ));
        let probe: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(Arc::clone(&runner)));

        let storage: Arc<dyn StoragePort> = match config.storage.backend {
            StorageBackend::Local => {
                Arc::new(LocalStorageAdapter::new(&config.storage.output_dir))
            }
            StorageBackend::Http => Arc::new(HttpStorageAdapter::new(
                config.storage.base_url.clone().unwrap_or_default(),
                config.storage.service_key.clone().unwrap_or_default(),
                config.storage.bucket.clone(),
                Duration::from_secs(config.storage.request_timeout_secs),
            )?),
        };
        info!("Storage backend: {:?}", config.storage.backend);

        let openai = &config.openai;
        let timeout = Duration::from_secs(openai.request_timeout_secs);
        let (insight, transcriber) = match openai.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let insight: Arc<dyn InsightPort> = Arc::new(OpenAiInsightAdapter::new(
                    &openai.base_url,
                    key,
                    &openai.chat_model,
                    openai.temperature,
                    timeout,
                )?);
                let transcriber: Arc<dyn TranscriptionPort> =
                    Arc::new(WhisperTranscriptionAdapter::new(
                        &openai.base_url,
                        key,
                        &openai.transcription_model,
                        timeout,
                    )?);
                (Some(insight), Some(transcriber))
            }
            None => {
                debug!("No OpenAI API key configured, insight features disabled");
                (None, None)
            }
        };

        Self::with_ports(
            config,
            Ports {
                runner,
                probe,
                storage,
                insight,
                transcriber,
            },
        )
    }

    /// Wire interactors around the given collaborators
    pub fn with_ports(config: &AppConfig, ports: Ports) -> Result<Self, DomainError> {
        let planner = TrimPlanner::new(Arc::clone(&ports.probe), config.encoder.clone())
            .with_default_frame_rate(config.default_frame_rate()?);
        let settings = ExecutorSettings {
            temp_root: config.trim.temp_dir.clone(),
            tool_timeout: config.tool_timeout(),
        };

        let mut executor = TrimExecutor::new(
            Arc::clone(&ports.runner),
            planner,
            Arc::clone(&ports.storage),
            settings,
        );
        if config.trim.verify_output {
            let validator = AccuracyValidator::new(config.trim.tolerance)?;
            executor = executor.with_verifier(OutputVerifier::new(Arc::clone(&ports.probe), validator));
        }

        let trim_interactor = Arc::new(TrimInteractor::new(
            executor,
            Arc::clone(&ports.probe),
            Arc::clone(&ports.storage),
            config.trim.default_mode,
            config.trim.temp_dir.clone(),
        ));
        let insight_interactor = Arc::new(InsightInteractor::new(ports.insight, ports.transcriber));

        Ok(Self {
            trim_interactor,
            insight_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn trim_interactor(&self) -> Arc<TrimInteractor> {
        Arc::clone(&self.trim_interactor)
    }

    fn insight_interactor(&self) -> Arc<InsightInteractor> {
        Arc::clone(&self.insight_interactor)
    }
}
