//! Trim execution against the external media tool

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaTool, ToolOutput, TrimRequest, TrimResult};
use crate::engine::{ExecutorSettings, TrimPhase, TrimWorkspace};
use crate::output::OutputVerifier;
use crate::planner::{TrimPlan, TrimPlanner};
use crate::ports::{MediaToolRunner, StoragePort};
use crate::utils::path::PathUtils;

/// Runs planned trims and hands the artifacts to durable storage
pub struct TrimExecutor {
    runner: Arc<dyn MediaToolRunner>,
    planner: TrimPlanner,
    storage: Arc<dyn StoragePort>,
    verifier: Option<OutputVerifier>,
    settings: ExecutorSettings,
}

impl TrimExecutor {
    pub fn new(
        runner: Arc<dyn MediaToolRunner>,
        planner: TrimPlanner,
        storage: Arc<dyn StoragePort>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            runner,
            planner,
            storage,
            verifier: None,
            settings,
        }
    }

    /// Probe and check produced clips before they are stored
    pub fn with_verifier(mut self, verifier: OutputVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn planner(&self) -> &TrimPlanner {
        &self.planner
    }

    /// Trim `source_bytes` as described by `request`.
    ///
    /// Bounds are checked before anything touches disk. The temporary input
    /// and output live in a per-call workspace that is removed on every exit
    /// path, after the storage outcome is known.
    pub async fn execute(
        &self,
        request: &TrimRequest,
        source_bytes: &[u8],
    ) -> Result<TrimResult, DomainError> {
        TrimPlanner::check_range(request.source_duration, request.start_time, request.end_time)?;
        let output_name =
            PathUtils::resolve_output_name(request.output_name.as_deref(), Utc::now())?;

        info!(
            "Starting trim of {} ({} bytes) as {}",
            request.source_ref,
            source_bytes.len(),
            output_name
        );

        let input_extension = PathUtils::extension_of(&request.source_ref);
        let output_extension = PathUtils::extension_of(&output_name);
        let workspace = TrimWorkspace::create(
            self.settings.temp_root.as_deref(),
            input_extension.as_deref(),
            output_extension.as_deref(),
        )?;

        let outcome = self
            .run_in_workspace(&workspace, request, source_bytes, &output_name)
            .await;
        workspace.close();

        match &outcome {
            Ok(result) => info!(
                "Trim {}: {} ({:.3}s)",
                TrimPhase::Completed,
                result.output_ref,
                result.actual_duration
            ),
            Err(e) => error!("Trim failed: {}", e),
        }
        outcome
    }

    async fn run_in_workspace(
        &self,
        workspace: &TrimWorkspace,
        request: &TrimRequest,
        source_bytes: &[u8],
        output_name: &str,
    ) -> Result<TrimResult, DomainError> {
        debug!("Phase: {}", TrimPhase::Staging);
        workspace.stage_input(source_bytes).await?;

        debug!("Phase: {}", TrimPhase::Planning);
        let plan = self
            .planner
            .plan(
                workspace.input_path(),
                request.source_duration,
                request.start_time,
                request.end_time,
                request.mode,
            )
            .await?;

        debug!("Phase: {}", TrimPhase::Trimming);
        self.run_plan(&plan, workspace).await?;

        let measured_duration = match &self.verifier {
            Some(verifier) => {
                debug!("Phase: {}", TrimPhase::Verifying);
                match verifier.verify(workspace.output_path(), plan.duration).await {
                    Ok(result) => result.measured_duration,
                    Err(e) => {
                        warn!("Output verification skipped: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        debug!("Phase: {}", TrimPhase::Storing);
        let output_ref = self
            .storage
            .store(workspace.output_path(), output_name)
            .await
            .map_err(|e| match e {
                DomainError::Upload(_) => e,
                other => DomainError::Upload(other.to_string()),
            })?;

        Ok(TrimResult {
            output_ref,
            filename: output_name.to_string(),
            actual_duration: plan.duration,
            start_time: plan.start,
            end_time: plan.end,
            mode: plan.strategy.mode(),
            measured_duration,
        })
    }

    /// Invoke ffmpeg for `plan` and confirm an artifact was produced
    async fn run_plan(&self, plan: &TrimPlan, workspace: &TrimWorkspace) -> Result<(), DomainError> {
        let args = plan.tool_args(workspace.input_path(), workspace.output_path());
        debug!("ffmpeg {}", args.join(" "));

        let output = self.run_tool(&args).await?;
        if !output.success() {
            let diagnostic = output.stderr.trim().to_string();
            error!("ffmpeg exited with {:?}: {}", output.exit_code, diagnostic);
            return Err(DomainError::Tool {
                code: output.exit_code,
                diagnostic,
            });
        }

        tokio::fs::metadata(workspace.output_path())
            .await
            .map_err(|e| DomainError::io("reading trimmed output", e))?;
        Ok(())
    }

    async fn run_tool(&self, args: &[String]) -> Result<ToolOutput, DomainError> {
        let run = self.runner.run(MediaTool::Ffmpeg, args);
        match self.settings.tool_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                DomainError::Tool {
                    code: None,
                    diagnostic: format!("ffmpeg timed out after {:.1}s", limit.as_secs_f64()),
                }
            })?,
            None => run.await,
        }
    }
}
