//! Structured view of a model completion.

use serde::Serialize;

use super::emotion_record::EmotionRecord;

/// Emotion label → record, in first-insertion order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedCompletion {
    records: Vec<EmotionRecord>,
}

impl ParsedCompletion {
    /// A completion with exactly one record.
    pub fn single(record: EmotionRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Build from records, keeping the first record for a repeated label.
    /// Returns `None` when `records` is empty.
    pub fn from_records(records: Vec<EmotionRecord>) -> Option<Self> {
        let mut deduped: Vec<EmotionRecord> = Vec::with_capacity(records.len());
        for record in records {
            if !deduped.iter().any(|r| r.emotion == record.emotion) {
                deduped.push(record);
            }
        }
        if deduped.is_empty() {
            None
        } else {
            Some(Self { records: deduped })
        }
    }

    /// The first record in insertion order.
    pub fn primary(&self) -> &EmotionRecord {
        &self.records[0]
    }

    pub fn get(&self, emotion: &str) -> Option<&EmotionRecord> {
        self.records.iter().find(|r| r.emotion == emotion)
    }

    pub fn emotions(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.emotion.as_str())
    }

    /// All labels joined with `", "`, the haystack for loose matching.
    pub fn joined_emotions(&self) -> String {
        self.emotions().collect::<Vec<_>>().join(", ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmotionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(emotion: &str, verse: &str) -> EmotionRecord {
        EmotionRecord::new(emotion, vec![verse.to_string()], "m")
    }

    #[test]
    fn test_from_records_keeps_first_duplicate() {
        let parsed =
            ParsedCompletion::from_records(vec![record("sad", "a"), record("tired", "b"), record("sad", "c")])
                .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.primary().verses[0], "a");
        assert_eq!(parsed.joined_emotions(), "sad, tired");
    }

    #[test]
    fn test_from_records_empty() {
        assert!(ParsedCompletion::from_records(vec![]).is_none());
    }

    #[test]
    fn test_single() {
        let parsed = ParsedCompletion::single(record("hopeful", "v"));
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.is_empty());
        assert_eq!(parsed.get("hopeful").unwrap().verses[0], "v");
    }
}
