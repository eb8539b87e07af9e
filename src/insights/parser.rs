//! Time-range parser for free-text collaborator responses

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::model::TimedSegment;
use crate::utils::time::parse_mm_ss;

/// `[MM:SS-MM:SS]` with optional brackets. Hour and fractional forms never match.
static TIME_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[?([0-9]{1,2}:[0-9]{2})-([0-9]{1,2}:[0-9]{2})\]?").unwrap());

/// Scan `text` for time-range tokens.
///
/// Each token's text runs up to the next token or the end of input. A match
/// is emitted only when both times parse, the trimmed text is non-empty and
/// the range is non-empty; anything else is skipped without failing the scan.
pub fn parse_time_ranges(text: &str) -> Vec<TimedSegment> {
    let matches: Vec<_> = TIME_RANGE_RE.captures_iter(text).collect();
    let mut segments = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(start), Some(end)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let body_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let body = text[whole.end()..body_end].trim();

        let (start, end) = match (parse_mm_ss(start.as_str()), parse_mm_ss(end.as_str())) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(e), _) | (_, Err(e)) => {
                debug!("Skipping malformed range {}: {}", whole.as_str(), e);
                continue;
            }
        };
        if body.is_empty() {
            debug!("Skipping range {} with no text", whole.as_str());
            continue;
        }

        match TimedSegment::new(start, end, body) {
            Ok(segment) => segments.push(segment),
            Err(e) => debug!("Skipping range {}: {}", whole.as_str(), e),
        }
    }

    segments
}
