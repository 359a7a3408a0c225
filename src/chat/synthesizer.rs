//! Fallback synthesis when no usable JSON can be extracted.
//!
//! Always produces exactly one record: a keyword-matched emotion (or
//! `unspecified`), a verse citation found in the text (or Proverbs 3:5), and a
//! bounded prefix of the raw text as the message.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::knowledge::{DEFAULT_ENCOURAGEMENT, DEFAULT_VERSE};
use crate::types::{EmotionRecord, ParsedCompletion};

/// Candidate emotions in priority order: curated labels and the legacy
/// `anxious` intent first, then general extras.
pub const CANDIDATE_EMOTIONS: &[&str] = &[
    "anxious",
    "excited",
    "satisfied",
    "joyful",
    "proud",
    "frustrated",
    "overwhelmed",
    "bored",
    "happy",
    "sad",
    "angry",
    "fearful",
    "hopeful",
];

/// Label used when no candidate emotion appears in the text.
pub const UNSPECIFIED: &str = "unspecified";

/// Maximum characters of raw text kept as the message.
pub const MESSAGE_PREFIX_CHARS: usize = 100;

// Optional 1-3 book prefix, book name, chapter:verse[-verse], separator,
// optional opening quote, text. Text ends at a line break, a closing quote
// or JSON punctuation, so truncated JSON does not leak into the verse.
static VERSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b((?:[1-3]\s*)?[a-z]+\s+\d+:\d+(?:-\d+)?)\s*[-–—:]\s*["“']?([^\n"”\]\}]+)"#,
    )
    .unwrap()
});

/// First candidate emotion (by list order) mentioned in `raw`.
pub fn detect_emotion(raw: &str) -> Option<&'static str> {
    let lowered = raw.to_lowercase();
    CANDIDATE_EMOTIONS
        .iter()
        .copied()
        .find(|emotion| lowered.contains(emotion))
}

/// First `Book C:V - text` citation in `raw`, normalised to `"Book C:V - text"`.
pub fn find_verse(raw: &str) -> Option<String> {
    let caps = VERSE_PATTERN.captures(raw)?;
    let citation = caps.get(1)?.as_str().trim();
    let text = caps
        .get(2)?
        .as_str()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim();
    if text.is_empty() {
        return None;
    }
    Some(format!("{} - {}", citation, text))
}

/// The first [`MESSAGE_PREFIX_CHARS`] characters of the trimmed text.
pub fn message_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_ENCOURAGEMENT.to_string();
    }
    trimmed.chars().take(MESSAGE_PREFIX_CHARS).collect()
}

/// Manufacture a one-entry completion from unstructured text. Never fails.
pub fn synthesize(raw: &str) -> ParsedCompletion {
    let emotion = detect_emotion(raw).unwrap_or(UNSPECIFIED);
    let verse = find_verse(raw).unwrap_or_else(|| DEFAULT_VERSE.to_string());
    ParsedCompletion::single(EmotionRecord::new(emotion, vec![verse], message_prefix(raw)))
}
