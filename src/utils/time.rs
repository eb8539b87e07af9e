//! Time parsing and formatting utilities
//!
//! The `MM:SS` codec is the transcript display form. It is lossy on purpose:
//! numeric values elsewhere keep full precision.

use crate::domain::errors::DomainError;

/// Format seconds as zero-padded `MM:SS`, truncating fractional seconds.
///
/// Negative and non-finite inputs render as `00:00`.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse a strict `MM:SS` token into whole seconds.
///
/// Exactly two colon-delimited unsigned integer parts are required; fractional
/// seconds, signs and hour components are rejected.
pub fn parse_mm_ss(text: &str) -> Result<f64, DomainError> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 2 {
        return Err(DomainError::Parse {
            input: text.to_string(),
            reason: format!("expected MM:SS, found {} part(s)", parts.len()),
        });
    }

    let minutes = parse_component(text, parts[0], "minutes")?;
    let seconds = parse_component(text, parts[1], "seconds")?;

    Ok(minutes as f64 * 60.0 + seconds as f64)
}

fn parse_component(input: &str, part: &str, name: &str) -> Result<u64, DomainError> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::Parse {
            input: input.to_string(),
            reason: format!("{} component '{}' is not numeric", name, part),
        });
    }
    part.parse::<u64>().map_err(|e| DomainError::Parse {
        input: input.to_string(),
        reason: format!("{} component '{}': {}", name, part, e),
    })
}

/// Parse a user-supplied time argument.
///
/// Accepts plain seconds (`12.5`), `MM:SS(.ms)` or `HH:MM:SS(.ms)`.
pub fn parse_time_argument(text: &str) -> Result<f64, DomainError> {
    let trimmed = text.trim();
    let invalid = |reason: &str| DomainError::Parse {
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid("time must be a non-negative number"));
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0u64, *m, *s),
        [h, m, s] => (
            h.parse::<u64>().map_err(|_| invalid("invalid hours"))?,
            *m,
            *s,
        ),
        _ => {
            return Err(invalid(
                "supported formats: seconds (123.45), MM:SS.ms (2:30.5), HH:MM:SS.ms (1:02:30.5)",
            ))
        }
    };

    let minutes = minutes.parse::<u64>().map_err(|_| invalid("invalid minutes"))?;
    let seconds = seconds.parse::<f64>().map_err(|_| invalid("invalid seconds"))?;
    if parts.len() == 3 && minutes >= 60 {
        return Err(invalid("minutes must be less than 60"));
    }
    if !(0.0..60.0).contains(&seconds) {
        return Err(invalid("seconds must be in [0, 60)"));
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Format seconds for a media tool argument with millisecond-safe precision
pub fn format_tool_seconds(seconds: f64) -> String {
    let fixed = format!("{:.6}", seconds);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss_pads_and_truncates() {
        assert_eq!(format_mm_ss(0.0), "00:00");
        assert_eq!(format_mm_ss(4.5), "00:04");
        assert_eq!(format_mm_ss(59.999), "00:59");
        assert_eq!(format_mm_ss(61.0), "01:01");
        assert_eq!(format_mm_ss(3599.9), "59:59");
        assert_eq!(format_mm_ss(6000.0), "100:00");
        assert_eq!(format_mm_ss(-3.0), "00:00");
    }

    #[test]
    fn test_parse_mm_ss() {
        assert_eq!(parse_mm_ss("00:05").unwrap(), 5.0);
        assert_eq!(parse_mm_ss("1:30").unwrap(), 90.0);
        assert_eq!(parse_mm_ss("12:03").unwrap(), 723.0);
    }

    #[test]
    fn test_parse_mm_ss_rejects_wrong_shape() {
        assert!(matches!(parse_mm_ss("1:2:3"), Err(DomainError::Parse { .. })));
        assert!(matches!(parse_mm_ss("90"), Err(DomainError::Parse { .. })));
        assert!(matches!(parse_mm_ss("ab:cd"), Err(DomainError::Parse { .. })));
        assert!(matches!(parse_mm_ss("01:02.5"), Err(DomainError::Parse { .. })));
        assert!(matches!(parse_mm_ss("-1:00"), Err(DomainError::Parse { .. })));
        assert!(matches!(parse_mm_ss(":30"), Err(DomainError::Parse { .. })));
    }

    #[test]
    fn test_round_trip_truncates_to_whole_seconds() {
        let mut s = 0.0;
        while s <= 3599.0 {
            let parsed = parse_mm_ss(&format_mm_ss(s)).unwrap();
            assert_eq!(parsed, s.floor(), "round trip failed for {}", s);
            s += 0.37;
        }
        for whole in 0..3600u32 {
            let s = whole as f64;
            assert_eq!(parse_mm_ss(&format_mm_ss(s)).unwrap(), s);
        }
    }

    #[test]
    fn test_parse_time_argument_formats() {
        assert_eq!(parse_time_argument("90.5").unwrap(), 90.5);
        assert_eq!(parse_time_argument("01:30").unwrap(), 90.0);
        assert_eq!(parse_time_argument("01:30.500").unwrap(), 90.5);
        assert_eq!(parse_time_argument("01:02:03.5").unwrap(), 3723.5);
        assert!(parse_time_argument("-10").is_err());
        assert!(parse_time_argument("00:60").is_err());
        assert!(parse_time_argument("1:60:00").is_err());
        assert!(parse_time_argument("soon").is_err());
    }

    #[test]
    fn test_format_tool_seconds() {
        assert_eq!(format_tool_seconds(5.0), "5");
        assert_eq!(format_tool_seconds(5.5), "5.5");
        assert_eq!(format_tool_seconds(15.7 - 5.5), "10.2");
        assert_eq!(format_tool_seconds(0.0), "0");
        assert_eq!(format_tool_seconds(0.123), "0.123");
    }
}
