//! Insight extraction from timestamped transcripts

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::TimedSegment;
use crate::ports::InsightPort;

pub mod fallback;
pub mod parser;

pub use fallback::lexical_matches;
pub use parser::parse_time_ranges;

/// Render segments as `[MM:SS-MM:SS] text` lines
pub fn render_transcript(segments: &[TimedSegment]) -> String {
    segments
        .iter()
        .map(TimedSegment::to_transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Finds the transcript segments relevant to a prompt
pub struct SegmentExtractor {
    generator: Arc<dyn InsightPort>,
}

impl SegmentExtractor {
    pub fn new(generator: Arc<dyn InsightPort>) -> Self {
        Self { generator }
    }

    /// Ask the collaborator for relevant ranges and parse its response.
    ///
    /// When the response yields no ranges, segments matching the prompt
    /// lexically are returned instead. An empty prompt or transcript yields an
    /// empty result without calling the collaborator.
    pub async fn extract(
        &self,
        segments: &[TimedSegment],
        prompt: &str,
    ) -> Result<Vec<TimedSegment>, DomainError> {
        let prompt = prompt.trim();
        if prompt.is_empty() || segments.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Extracting insights from {} segments for prompt: {}",
            segments.len(),
            prompt
        );
        let transcript = render_transcript(segments);
        let response = self
            .generator
            .generate(&transcript, prompt)
            .await
            .map_err(|e| match e {
                DomainError::Extraction(_) => e,
                other => DomainError::Extraction(other.to_string()),
            })?;

        let parsed = parse_time_ranges(&response);
        if !parsed.is_empty() {
            info!("Extracted {} segments from response", parsed.len());
            return Ok(parsed);
        }

        let matched = lexical_matches(segments, prompt);
        warn!(
            "Response contained no time ranges, lexical fallback matched {} segments",
            matched.len()
        );
        Ok(matched)
    }

    /// Same as [`extract`](Self::extract) for a transcript already rendered
    /// with embedded `[MM:SS-MM:SS]` ranges
    pub async fn extract_from_text(
        &self,
        transcript_text: &str,
        prompt: &str,
    ) -> Result<Vec<TimedSegment>, DomainError> {
        let segments = parse_time_ranges(transcript_text);
        self.extract(&segments, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let segments = vec![
            TimedSegment::new(0.0, 4.5, "intro").unwrap(),
            TimedSegment::new(64.0, 70.0, "pricing").unwrap(),
        ];
        assert_eq!(
            render_transcript(&segments),
            "[00:00-00:04] intro\n[01:04-01:10] pricing"
        );
        assert_eq!(render_transcript(&[]), "");
    }
}
