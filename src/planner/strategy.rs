//! Trim strategy implementation

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{EncoderSettings, FrameRate, SyncMode};
use crate::domain::rules::RangeRules;
use crate::planner::{TrimPlan, TrimStrategy};
use crate::ports::ProbePort;

/// Strategy planner for determining trim parameters
pub struct TrimPlanner {
    probe: Arc<dyn ProbePort>,
    encoder: EncoderSettings,
    default_frame_rate: FrameRate,
}

impl TrimPlanner {
    /// Create a new planner
    pub fn new(probe: Arc<dyn ProbePort>, encoder: EncoderSettings) -> Self {
        Self {
            probe,
            encoder,
            default_frame_rate: FrameRate::DEFAULT,
        }
    }

    /// Override the rate substituted when probing fails
    pub fn with_default_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.default_frame_rate = frame_rate;
        self
    }

    /// Validate bounds without touching the source; returns the clip duration
    pub fn check_range(
        source_duration: Option<f64>,
        start: f64,
        end: f64,
    ) -> Result<f64, DomainError> {
        RangeRules::check(start, end, source_duration)
    }

    /// Plan a trim of `source`.
    ///
    /// Bounds are validated first; the source is only probed for its frame
    /// rate in re-encode mode.
    pub async fn plan(
        &self,
        source: &Path,
        source_duration: Option<f64>,
        start: f64,
        end: f64,
        mode: SyncMode,
    ) -> Result<TrimPlan, DomainError> {
        let duration = Self::check_range(source_duration, start, end)?;
        info!(
            "Planning {} trim: {:.3}s - {:.3}s ({:.3}s)",
            mode, start, end, duration
        );

        let strategy = match mode {
            SyncMode::StreamCopy => TrimStrategy::StreamCopy,
            SyncMode::ReEncode => TrimStrategy::ReEncode {
                frame_rate: self.resolve_frame_rate(source).await,
            },
        };

        let plan = TrimPlan {
            start,
            end,
            duration,
            strategy,
            encoder: self.encoder.clone(),
        };
        debug!("Trim plan: {:?}", plan);
        Ok(plan)
    }

    /// Probe the source frame rate, substituting the default on any failure
    async fn resolve_frame_rate(&self, source: &Path) -> FrameRate {
        match self.probe.probe_frame_rate(source).await {
            Ok(Some(rate)) => {
                info!("Detected source frame rate: {}", rate);
                rate
            }
            Ok(None) => {
                warn!(
                    "Frame rate not discoverable for {}, using {}",
                    source.display(),
                    self.default_frame_rate
                );
                self.default_frame_rate
            }
            Err(e) => {
                warn!(
                    "Frame rate probe failed ({}), using {}",
                    e, self.default_frame_rate
                );
                self.default_frame_rate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProbe {
        frame_rate: Result<Option<FrameRate>, ()>,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(frame_rate: Result<Option<FrameRate>, ()>) -> Arc<Self> {
            Arc::new(Self {
                frame_rate,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProbePort for ScriptedProbe {
        async fn probe_frame_rate(&self, _path: &Path) -> Result<Option<FrameRate>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.frame_rate
                .map_err(|_| DomainError::Tool {
                    code: Some(1),
                    diagnostic: "probe failed".to_string(),
                })
        }

        async fn probe_duration(&self, _path: &Path) -> Result<Option<f64>, DomainError> {
            Ok(None)
        }
    }

    fn planner(probe: Arc<ScriptedProbe>) -> TrimPlanner {
        TrimPlanner::new(probe, EncoderSettings::default())
    }

    #[tokio::test]
    async fn test_reencode_plan_uses_detected_rate() {
        let rate = FrameRate::new(25, 1).unwrap();
        let probe = ScriptedProbe::new(Ok(Some(rate)));
        let plan = planner(probe.clone())
            .plan(Path::new("in.mp4"), Some(80.0), 5.0, 15.0, SyncMode::ReEncode)
            .await
            .unwrap();

        assert_eq!(plan.duration, 10.0);
        assert_eq!(plan.frame_rate(), Some(rate));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reencode_plan_defaults_to_30fps() {
        for outcome in [Ok(None), Err(())] {
            let plan = planner(ScriptedProbe::new(outcome))
                .plan(Path::new("in.mp4"), Some(80.0), 5.0, 15.0, SyncMode::ReEncode)
                .await
                .unwrap();
            assert_eq!(plan.frame_rate(), Some(FrameRate::DEFAULT));
        }
    }

    #[tokio::test]
    async fn test_stream_copy_plan_skips_probe() {
        let probe = ScriptedProbe::new(Ok(None));
        let plan = planner(probe.clone())
            .plan(Path::new("in.mp4"), None, 2.0, 7.0, SyncMode::StreamCopy)
            .await
            .unwrap();

        assert_eq!(plan.strategy, TrimStrategy::StreamCopy);
        assert_eq!(plan.frame_rate(), None);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_range_rejected_before_probe() {
        let probe = ScriptedProbe::new(Ok(None));
        let planner = planner(probe.clone());

        let inverted = planner
            .plan(Path::new("in.mp4"), Some(80.0), 10.0, 5.0, SyncMode::ReEncode)
            .await;
        assert!(matches!(inverted, Err(DomainError::Range(_))));

        let past_end = planner
            .plan(Path::new("in.mp4"), Some(80.0), 70.0, 90.0, SyncMode::StreamCopy)
            .await;
        assert!(matches!(past_end, Err(DomainError::Range(_))));

        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_configured_default_rate() {
        let fallback = FrameRate::new(24, 1).unwrap();
        let plan = planner(ScriptedProbe::new(Ok(None)))
            .with_default_frame_rate(fallback)
            .plan(Path::new("in.mp4"), None, 0.0, 1.0, SyncMode::ReEncode)
            .await
            .unwrap();
        assert_eq!(plan.frame_rate(), Some(fallback));
    }
}
