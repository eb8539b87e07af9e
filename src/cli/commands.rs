//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::insight_interactor::{ExtractRequest, TranscriptInput};
use crate::app::trim_interactor::{TrimFileOptions, TrimServiceRequest, TrimServiceResponse};
use crate::app::{AppContainer, DefaultAppContainer, ServiceFailure};
use crate::cli::args::{
    EngineKind, ExtractArgs, PlanArgs, ServeRequestArgs, TranscribeArgs, TrimArgs, ValidateArgs,
};
use crate::cli::Commands;
use crate::domain::errors::DomainError;
use crate::domain::rules::AccuracyValidator;

/// Run one parsed command against the given configuration
pub async fn dispatch(command: Commands, config: &AppConfig) -> Result<()> {
    if !command.needs_container() {
        return match command {
            Commands::Validate(args) => validate(args),
            _ => Ok(()),
        };
    }

    let container = DefaultAppContainer::from_config(config)
        .context("Failed to initialize adapters")?;
    match command {
        Commands::Trim(args) => trim(&container, args).await,
        Commands::Plan(args) => plan(&container, args).await,
        Commands::Extract(args) => extract(&container, args).await,
        Commands::Transcribe(args) => transcribe(&container, args).await,
        Commands::ServeRequest(args) => serve_request(&container, args).await,
        Commands::Validate(args) => validate(args),
    }
}

/// Execute the trim command
pub async fn trim(container: &dyn AppContainer, args: TrimArgs) -> Result<()> {
    info!("Starting trim operation");
    info!("Input: {}", args.input.display());
    info!("Range: {}s - {}s", args.start, args.end);

    let interactor = container.trim_interactor();
    let result = match args.engine {
        EngineKind::Tool => {
            let options = TrimFileOptions {
                output_name: args.output_name,
                mode: args.mode,
                source_duration: args.duration,
            };
            interactor
                .trim_file(&args.input, args.start, args.end, options)
                .await?
        }
        EngineKind::InProcess => {
            let (cancel_tx, cancel_rx) = watch::channel(false);
            let listener = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling trim");
                    let _ = cancel_tx.send(true);
                }
            });
            let outcome = interactor
                .trim_in_process(
                    &args.input,
                    args.start,
                    args.end,
                    args.output_name.as_deref(),
                    cancel_rx,
                )
                .await;
            listener.abort();
            outcome?
        }
    };

    info!("Trim completed: {}", result.output_ref);
    print_json(&result)
}

#[derive(Serialize)]
struct PlanReport<'a> {
    mode: String,
    start: f64,
    end: f64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_rate: Option<String>,
    args: &'a [String],
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs) -> Result<()> {
    let (plan, tool_args) = container
        .trim_interactor()
        .plan_file(&args.input, args.start, args.end, args.mode, args.duration)
        .await?;

    print_json(&PlanReport {
        mode: plan.strategy.mode().to_string(),
        start: plan.start,
        end: plan.end,
        duration: plan.duration,
        frame_rate: plan.frame_rate().map(|rate| rate.to_string()),
        args: &tool_args,
    })
}

/// Execute the extract command
pub async fn extract(container: &dyn AppContainer, args: ExtractArgs) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.transcript)
        .await
        .with_context(|| format!("Failed to read transcript {}", args.transcript.display()))?;
    let transcript = parse_transcript(&content);

    let response = container
        .insight_interactor()
        .extract(ExtractRequest {
            transcript,
            prompt: args.prompt,
        })
        .await?;
    print_json(&response)
}

/// Execute the transcribe command
pub async fn transcribe(container: &dyn AppContainer, args: TranscribeArgs) -> Result<()> {
    info!("Transcribing {}", args.input.display());
    let response = container
        .insight_interactor()
        .transcribe_file(&args.input)
        .await?;
    print_json(&response)
}

/// Execute the serve-request command.
///
/// The response payload is always printed; a failure payload also makes the
/// command fail.
pub async fn serve_request(container: &dyn AppContainer, args: ServeRequestArgs) -> Result<()> {
    let body = read_request(&args.request).await?;
    let response = match serde_json::from_str::<TrimServiceRequest>(&body) {
        Ok(request) => container.trim_interactor().handle(request).await,
        Err(e) => {
            warn!("Rejected trim request: {}", e);
            let error = DomainError::BadArgs(format!("Request is not a valid trim request: {}", e));
            TrimServiceResponse::Failure(ServiceFailure::from(&error))
        }
    };
    print_json(&response)?;

    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!("Request failed with status {}", response.status_code())
    }
}

/// Execute the validate command
pub fn validate(args: ValidateArgs) -> Result<()> {
    let validator = AccuracyValidator::new(args.tolerance)?;
    let report = validator.check(args.expected, args.actual);
    print_json(&report)?;

    if !report.within_tolerance {
        anyhow::bail!(
            "Duration {:.3}s is {:.1}ms away from {:.3}s (tolerance {:.1}ms)",
            args.actual,
            report.difference_ms,
            args.expected,
            report.tolerance_ms
        );
    }
    Ok(())
}

/// Segment list JSON when it parses as one, rendered text otherwise
fn parse_transcript(content: &str) -> TranscriptInput {
    match serde_json::from_str::<TranscriptInput>(content) {
        Ok(transcript) => transcript,
        Err(_) => TranscriptInput::Text(content.to_string()),
    }
}

async fn read_request(source: &str) -> Result<String> {
    if source == "-" {
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("Failed to read request from stdin")?;
        return Ok(body);
    }
    tokio::fs::read_to_string(Path::new(source))
        .await
        .with_context(|| format!("Failed to read request {}", source))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_forms() {
        let segments = parse_transcript(r#"[{"start":0,"end":3,"text":"hello"}]"#);
        assert!(matches!(segments, TranscriptInput::Segments(ref s) if s.len() == 1));

        let text = parse_transcript("[00:00-00:03] hello");
        assert_eq!(text, TranscriptInput::Text("[00:00-00:03] hello".to_string()));
    }

    #[test]
    fn test_validate_command() {
        let within = ValidateArgs {
            expected: 10.0,
            actual: 10.02,
            tolerance: 0.05,
        };
        assert!(validate(within).is_ok());

        let outside = ValidateArgs {
            expected: 10.0,
            actual: 10.2,
            tolerance: 0.05,
        };
        assert!(validate(outside).is_err());
    }
}
