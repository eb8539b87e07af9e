//! In-process fallback trimmer
//!
//! Used when the external media tool is unavailable. The source is seeked
//! frame by frame and every drawn frame is handed to a capture sink at a fixed
//! 30 fps cadence. Output is always re-encoded; no stream-copy path exists.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::FrameRate;

pub mod y4m;

pub use y4m::{Y4mSink, Y4mSource};

/// Fixed capture cadence
pub const CAPTURE_RATE: FrameRate = FrameRate { num: 30, den: 1 };

/// Stream properties discovered when the source loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    /// Seconds
    pub duration: f64,
    pub frame_rate: FrameRate,
    /// Container-specific pixel layout tag, passed through to the sink
    pub pixel_format: Option<String>,
}

/// A seekable decoded-frame source
pub trait FrameSource {
    /// Load stream metadata. Failure is terminal.
    fn load_metadata(&mut self) -> Result<SourceMetadata, DomainError>;

    /// Position the source at `position` seconds
    fn seek(&mut self, position: f64) -> Result<(), DomainError>;

    /// Draw the frame at the current position
    fn current_frame(&mut self) -> Result<&[u8], DomainError>;
}

/// Receives captured frames and assembles the output artifact
pub trait CaptureSink {
    type Output;

    fn start(&mut self, metadata: &SourceMetadata, rate: FrameRate) -> Result<(), DomainError>;

    fn capture(&mut self, frame: &[u8]) -> Result<(), DomainError>;

    fn finalize(&mut self) -> Result<Self::Output, DomainError>;

    /// Abandon the capture stream and discard anything partial
    fn release(&mut self);
}

/// Fallback trimmer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackState {
    Idle,
    MetadataLoaded,
    Seeking,
    Capturing,
    Finalized,
    /// Terminal after any decode or capture failure
    Failed,
}

/// Frame-by-frame trimmer driving a [`FrameSource`] into a [`CaptureSink`]
pub struct FallbackTrimmer<S: FrameSource, K: CaptureSink> {
    source: S,
    sink: K,
    state: FallbackState,
    start: f64,
    end: f64,
    position: f64,
    frames_captured: u64,
    max_frames: u64,
    metadata: Option<SourceMetadata>,
    sink_started: bool,
    pacing: Option<Duration>,
}

impl<S: FrameSource, K: CaptureSink> FallbackTrimmer<S, K> {
    pub fn new(source: S, sink: K, start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(DomainError::Range(format!(
                "invalid fallback range {} - {}",
                start, end
            )));
        }

        Ok(Self {
            source,
            sink,
            state: FallbackState::Idle,
            start,
            end,
            position: start,
            frames_captured: 0,
            max_frames: ((end - start) * CAPTURE_RATE.as_f64()).ceil() as u64,
            metadata: None,
            sink_started: false,
            pacing: None,
        })
    }

    /// Pace capture steps in real time (one frame interval per step)
    pub fn with_pacing(mut self) -> Self {
        self.pacing = Some(Duration::from_secs_f64(CAPTURE_RATE.frame_duration()));
        self
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    /// Upper bound on captured frames for the requested range
    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    pub fn metadata(&self) -> Option<&SourceMetadata> {
        self.metadata.as_ref()
    }

    /// Idle -> MetadataLoaded
    pub fn load_metadata(&mut self) -> Result<&SourceMetadata, DomainError> {
        self.expect_state(FallbackState::Idle)?;

        let metadata = match self.source.load_metadata() {
            Ok(metadata) => metadata,
            Err(e) => return Err(self.fail(e)),
        };
        if self.end > metadata.duration {
            let err = DomainError::Range(format!(
                "end time ({}) exceeds source duration ({})",
                self.end, metadata.duration
            ));
            return Err(self.fail(err));
        }

        info!(
            "Fallback source loaded: {}x{}, {:.3}s at {}",
            metadata.width, metadata.height, metadata.duration, metadata.frame_rate
        );
        self.state = FallbackState::MetadataLoaded;
        Ok(self.metadata.insert(metadata))
    }

    /// MetadataLoaded -> Seeking
    pub fn begin_seek(&mut self) -> Result<(), DomainError> {
        self.expect_state(FallbackState::MetadataLoaded)?;
        if let Err(e) = self.source.seek(self.start) {
            return Err(self.fail(e));
        }
        self.state = FallbackState::Seeking;
        Ok(())
    }

    /// Seeking -> Capturing
    pub fn start_capture(&mut self) -> Result<(), DomainError> {
        self.expect_state(FallbackState::Seeking)?;
        let started = match &self.metadata {
            Some(metadata) => self.sink.start(metadata, CAPTURE_RATE),
            None => Err(DomainError::Capture(
                "capture started without metadata".to_string(),
            )),
        };
        if let Err(e) = started {
            return Err(self.fail(e));
        }
        self.sink_started = true;
        self.state = FallbackState::Capturing;
        Ok(())
    }

    /// Capture one frame and advance. Returns `true` once the range is complete.
    pub fn step(&mut self) -> Result<bool, DomainError> {
        self.expect_state(FallbackState::Capturing)?;

        let captured = match self.source.current_frame() {
            Ok(frame) => self.sink.capture(frame),
            Err(e) => Err(e),
        };
        if let Err(e) = captured {
            return Err(self.fail(e));
        }

        self.frames_captured += 1;
        self.position = (self.start
            + self.frames_captured as f64 * CAPTURE_RATE.frame_duration())
        .min(self.end);

        if self.position >= self.end || self.frames_captured >= self.max_frames {
            return Ok(true);
        }

        if let Err(e) = self.source.seek(self.position) {
            return Err(self.fail(e));
        }
        Ok(false)
    }

    /// Capturing -> Finalized
    pub fn finalize(&mut self) -> Result<K::Output, DomainError> {
        self.expect_state(FallbackState::Capturing)?;
        match self.sink.finalize() {
            Ok(output) => {
                self.state = FallbackState::Finalized;
                info!(
                    "Fallback trim finalized: {} frames ({:.3}s - {:.3}s)",
                    self.frames_captured, self.start, self.position
                );
                Ok(output)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Drive the whole state machine synchronously
    pub fn trim(mut self) -> Result<K::Output, DomainError> {
        self.load_metadata()?;
        self.begin_seek()?;
        self.start_capture()?;
        while !self.step()? {}
        self.finalize()
    }

    /// Drive the state machine cooperatively.
    ///
    /// Setting `cancel` to `true` stops scheduling further steps and
    /// releases the capture stream. Dropping the future has the same effect.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) -> Result<K::Output, DomainError> {
        self.load_metadata()?;
        self.begin_seek()?;
        self.start_capture()?;

        let mut ticker = self.pacing.map(tokio::time::interval);
        let mut cancel_open = true;
        loop {
            if *cancel.borrow_and_update() {
                return Err(self.cancel());
            }
            match ticker.as_mut() {
                Some(ticker) => {
                    tokio::select! {
                        _ = ticker.tick() => {}
                        changed = cancel.changed(), if cancel_open => {
                            // A dropped sender can never cancel
                            cancel_open = changed.is_ok();
                            continue;
                        }
                    }
                }
                None => tokio::task::yield_now().await,
            }
            if self.step()? {
                break;
            }
        }
        self.finalize()
    }

    fn cancel(&mut self) -> DomainError {
        warn!(
            "Fallback trim cancelled after {} frames",
            self.frames_captured
        );
        self.fail(DomainError::Capture("capture cancelled".to_string()))
    }

    fn expect_state(&self, expected: FallbackState) -> Result<(), DomainError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DomainError::Capture(format!(
                "invalid transition from {:?} (expected {:?})",
                self.state, expected
            )))
        }
    }

    fn fail(&mut self, err: DomainError) -> DomainError {
        debug!("Fallback trimmer failed in {:?}: {}", self.state, err);
        self.release_sink();
        self.state = FallbackState::Failed;
        err
    }

    fn release_sink(&mut self) {
        if self.sink_started {
            self.sink.release();
            self.sink_started = false;
        }
    }
}

impl<S: FrameSource, K: CaptureSink> Drop for FallbackTrimmer<S, K> {
    fn drop(&mut self) {
        if self.state != FallbackState::Finalized {
            self.release_sink();
        }
    }
}

#[cfg(test)]
mod tests;
