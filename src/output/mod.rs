//! Output verification module

use serde::{Deserialize, Serialize};

pub mod verifier;

pub use verifier::OutputVerifier;

/// Output verification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Requested clip duration
    pub expected_duration: f64,
    /// Duration probed from the artifact, when discoverable
    pub measured_duration: Option<f64>,
    /// Difference in milliseconds, when measured
    pub difference_ms: Option<f64>,
    /// Measured duration falls within tolerance
    pub within_tolerance: bool,
}
