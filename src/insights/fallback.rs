//! Lexical fallback used when a response carries no usable time ranges

use crate::domain::model::TimedSegment;

/// Words that take part in lexical matching
const MIN_KEYWORD_CHARS: usize = 4;

/// Lower-cased prompt words longer than three characters
pub fn prompt_keywords(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Segments whose lower-cased text contains at least one prompt keyword, in order
pub fn lexical_matches(segments: &[TimedSegment], prompt: &str) -> Vec<TimedSegment> {
    let keywords = prompt_keywords(prompt);
    if keywords.is_empty() {
        return Vec::new();
    }

    segments
        .iter()
        .filter(|segment| {
            let text = segment.text().to_lowercase();
            keywords.iter().any(|word| text.contains(word.as_str()))
        })
        .cloned()
        .collect()
}
