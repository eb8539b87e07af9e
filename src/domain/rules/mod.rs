// Domain rules - Business logic and policies

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;

/// Maximum accepted absolute duration error, in seconds (50ms)
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Absorbs binary floating point representation error at the tolerance edge
const COMPARISON_EPSILON: f64 = 1e-9;

/// Business rules for trim bounds
pub struct RangeRules;

impl RangeRules {
    /// Validate requested bounds and return the clip duration.
    ///
    /// `source_duration` is only enforced when known.
    pub fn check(start: f64, end: f64, source_duration: Option<f64>) -> Result<f64, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::Range(
                "start and end must be finite numbers".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::Range(format!(
                "start time cannot be negative ({})",
                start
            )));
        }
        if end <= start {
            return Err(DomainError::Range(format!(
                "end time ({}) must be greater than start time ({})",
                end, start
            )));
        }
        if let Some(duration) = source_duration {
            if end > duration {
                return Err(DomainError::Range(format!(
                    "end time ({}) exceeds source duration ({})",
                    end, duration
                )));
            }
        }

        Ok(end - start)
    }
}

/// Checks produced clip durations against the requested ones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyValidator {
    tolerance: f64,
}

impl Default for AccuracyValidator {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl AccuracyValidator {
    /// Create a validator with a custom tolerance in seconds
    pub fn new(tolerance: f64) -> Result<Self, DomainError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(DomainError::Config(format!(
                "Tolerance must be a positive number of seconds, got {}",
                tolerance
            )));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// `abs(actual - expected) <= tolerance`
    pub fn validate(&self, expected: f64, actual: f64) -> bool {
        validate(expected, actual, self.tolerance)
    }

    /// Produce a detailed report instead of a bare verdict
    pub fn check(&self, expected: f64, actual: f64) -> AccuracyReport {
        let difference = (actual - expected).abs();
        AccuracyReport {
            expected,
            actual,
            difference_ms: difference * 1000.0,
            tolerance_ms: self.tolerance * 1000.0,
            within_tolerance: self.validate(expected, actual),
        }
    }
}

/// Free-standing form of [`AccuracyValidator::validate`]
pub fn validate(expected: f64, actual: f64, tolerance: f64) -> bool {
    if !expected.is_finite() || !actual.is_finite() {
        return false;
    }
    (actual - expected).abs() <= tolerance + COMPARISON_EPSILON
}

/// Accuracy verdict with the measured difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub expected: f64,
    pub actual: f64,
    pub difference_ms: f64,
    pub tolerance_ms: f64,
    pub within_tolerance: bool,
}

#[cfg(test)]
mod tests;
