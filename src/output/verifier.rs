//! Output verification implementation

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::rules::AccuracyValidator;
use crate::output::VerificationResult;
use crate::ports::ProbePort;

/// Probes produced clips and checks their duration against the request
pub struct OutputVerifier {
    probe: Arc<dyn ProbePort>,
    validator: AccuracyValidator,
}

impl OutputVerifier {
    pub fn new(probe: Arc<dyn ProbePort>, validator: AccuracyValidator) -> Self {
        Self { probe, validator }
    }

    /// Verify a produced clip.
    ///
    /// Verification is advisory: an out-of-tolerance clip is reported and
    /// logged but never rejected here.
    pub async fn verify(
        &self,
        output_path: &Path,
        expected_duration: f64,
    ) -> Result<VerificationResult, DomainError> {
        info!("Verifying output: {}", output_path.display());

        let measured = self.probe.probe_duration(output_path).await?;
        let result = match measured {
            Some(actual) => {
                let report = self.validator.check(expected_duration, actual);
                VerificationResult {
                    expected_duration,
                    measured_duration: Some(actual),
                    difference_ms: Some(report.difference_ms),
                    within_tolerance: report.within_tolerance,
                }
            }
            None => VerificationResult {
                expected_duration,
                measured_duration: None,
                difference_ms: None,
                within_tolerance: false,
            },
        };

        match (result.measured_duration, result.within_tolerance) {
            (Some(actual), true) => info!(
                "Verification passed: {:.3}s (expected {:.3}s)",
                actual, expected_duration
            ),
            (Some(actual), false) => warn!(
                "Output duration {:.3}s differs from requested {:.3}s by more than {:.0}ms",
                actual,
                expected_duration,
                self.validator.tolerance() * 1000.0
            ),
            (None, _) => warn!(
                "Output duration not discoverable for {}",
                output_path.display()
            ),
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FrameRate;
    use async_trait::async_trait;

    struct FixedDuration(Option<f64>);

    #[async_trait]
    impl ProbePort for FixedDuration {
        async fn probe_frame_rate(&self, _path: &Path) -> Result<Option<FrameRate>, DomainError> {
            Ok(None)
        }

        async fn probe_duration(&self, _path: &Path) -> Result<Option<f64>, DomainError> {
            Ok(self.0)
        }
    }

    fn verifier(measured: Option<f64>) -> OutputVerifier {
        OutputVerifier::new(Arc::new(FixedDuration(measured)), AccuracyValidator::default())
    }

    #[tokio::test]
    async fn test_within_tolerance() {
        let result = verifier(Some(10.04))
            .verify(Path::new("out.mp4"), 10.0)
            .await
            .unwrap();
        assert!(result.within_tolerance);
        assert_eq!(result.measured_duration, Some(10.04));
    }

    #[tokio::test]
    async fn test_outside_tolerance_is_reported() {
        let result = verifier(Some(10.2))
            .verify(Path::new("out.mp4"), 10.0)
            .await
            .unwrap();
        assert!(!result.within_tolerance);
        let diff = result.difference_ms.unwrap();
        assert!((diff - 200.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_duration() {
        let result = verifier(None).verify(Path::new("out.mp4"), 10.0).await.unwrap();
        assert!(!result.within_tolerance);
        assert_eq!(result.measured_duration, None);
    }
}
