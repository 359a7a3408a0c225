//! The `{emotion, verses, message}` record shared by the knowledge base and
//! parsed model output.

use serde::{Deserialize, Serialize};

/// A scriptural response for a single emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionRecord {
    /// Lower-case emotion label, e.g. `"excited"`.
    pub emotion: String,
    /// Verse citations with text, in the order they should be shown.
    pub verses: Vec<String>,
    /// Encouragement accompanying the verses.
    pub message: String,
}

impl EmotionRecord {
    /// Create a record, normalising the emotion label.
    pub fn new(
        emotion: impl AsRef<str>,
        verses: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            emotion: normalize_label(emotion.as_ref()),
            verses,
            message: message.into(),
        }
    }

    /// A record is usable when it names an emotion and carries at least one
    /// non-blank verse.
    pub fn is_valid(&self) -> bool {
        !self.emotion.is_empty() && self.verses.iter().any(|v| !v.trim().is_empty())
    }

    /// All verses joined for display, one per line.
    pub fn verse_text(&self) -> String {
        self.verses.join("\n")
    }
}

/// Normalise an emotion label to the trimmed lower-case form used as a key.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_label() {
        let record = EmotionRecord::new("  Excited ", vec!["v".into()], "m");
        assert_eq!(record.emotion, "excited");
    }

    #[test]
    fn test_is_valid() {
        assert!(EmotionRecord::new("joyful", vec!["Philippians 4:4".into()], "").is_valid());
        assert!(!EmotionRecord::new("joyful", vec![], "m").is_valid());
        assert!(!EmotionRecord::new("joyful", vec!["  ".into()], "m").is_valid());
        assert!(!EmotionRecord::new(" ", vec!["v".into()], "m").is_valid());
    }

    #[test]
    fn test_verse_text_joins_lines() {
        let record = EmotionRecord::new("sad", vec!["a".into(), "b".into()], "m");
        assert_eq!(record.verse_text(), "a\nb");
    }
}
