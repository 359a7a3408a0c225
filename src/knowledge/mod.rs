//! Curated knowledge base of emotion → scripture mappings.
//!
//! The knowledge base is built once at startup, either from the built-in
//! table or from a YAML file, and is read-only afterwards. Iteration order is
//! the curated order and acts as the reconciliation tiebreak.
//!
//! # YAML format
//!
//! ```yaml
//! - emotion: excited
//!   verses:
//!     - "2 Timothy 1:7 - For God did not give us a spirit of fear..."
//!   message: "Let that energy carry you forward."
//! ```

mod curated;

use std::collections::HashSet;
use std::path::Path;

use crate::errors::KnowledgeError;
use crate::types::{normalize_label, EmotionRecord};

pub use curated::{DEFAULT_ENCOURAGEMENT, DEFAULT_VERSE};

/// Immutable, ordered mapping from emotion label to curated record.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<EmotionRecord>,
}

impl KnowledgeBase {
    /// The built-in curated table.
    pub fn curated() -> Self {
        let entries = curated::CURATED
            .iter()
            .map(|(emotion, verse, message)| {
                EmotionRecord::new(emotion, vec![(*verse).to_string()], *message)
            })
            .collect();
        Self { entries }
    }

    /// Build a knowledge base from records, validating labels and verses.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::Validation`] for an empty table, a record
    /// without verses, a multi-word label, or a duplicate label.
    pub fn from_records(records: Vec<EmotionRecord>) -> Result<Self, KnowledgeError> {
        if records.is_empty() {
            return Err(KnowledgeError::Validation(
                "knowledge base must contain at least one entry".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(records.len());
        for mut record in records {
            record.emotion = normalize_label(&record.emotion);
            if record.emotion.split_whitespace().count() != 1 {
                return Err(KnowledgeError::Validation(format!(
                    "emotion label {:?} must be a single word",
                    record.emotion
                )));
            }
            if !record.is_valid() {
                return Err(KnowledgeError::Validation(format!(
                    "entry '{}' has no verses",
                    record.emotion
                )));
            }
            if !seen.insert(record.emotion.clone()) {
                return Err(KnowledgeError::Validation(format!(
                    "duplicate entry '{}'",
                    record.emotion
                )));
            }
            entries.push(record);
        }

        Ok(Self { entries })
    }

    /// Parse a YAML list of records.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, KnowledgeError> {
        let records: Vec<EmotionRecord> = serde_yaml::from_str(yaml)?;
        Self::from_records(records)
    }

    /// Load a YAML knowledge base file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let kb = Self::from_yaml_str(&content)?;
        log::info!(
            "Loaded knowledge base from {} ({} entries)",
            path.display(),
            kb.len()
        );
        Ok(kb)
    }

    /// Look up an entry by exact label (case-insensitive).
    pub fn get(&self, emotion: &str) -> Option<&EmotionRecord> {
        let key = normalize_label(emotion);
        self.entries.iter().find(|r| r.emotion == key)
    }

    pub fn contains(&self, emotion: &str) -> bool {
        self.get(emotion).is_some()
    }

    /// Entries in curated order.
    pub fn iter(&self) -> impl Iterator<Item = &EmotionRecord> {
        self.entries.iter()
    }

    /// Labels in curated order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.emotion.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::curated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_curated_order_and_contents() {
        let kb = KnowledgeBase::curated();
        let labels: Vec<&str> = kb.labels().collect();
        assert_eq!(
            labels,
            vec!["excited", "satisfied", "joyful", "proud", "frustrated", "overwhelmed", "bored"]
        );
        assert!(kb.iter().all(|r| r.is_valid()));
        assert!(!kb.contains("anxious"));
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let kb = KnowledgeBase::curated();
        let record = kb.get("Excited").unwrap();
        assert!(record.verses[0].starts_with("2 Timothy 1:7"));
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
- emotion: Lonely
  verses:
    - "Deuteronomy 31:6 - He will never leave you nor forsake you."
  message: "You are not alone."
- emotion: grateful
  verses:
    - "1 Thessalonians 5:18 - Give thanks in all circumstances."
  message: "Keep counting blessings."
"#;
        let kb = KnowledgeBase::from_yaml_str(yaml).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.labels().next(), Some("lonely"));
        assert_eq!(kb.get("grateful").unwrap().message, "Keep counting blessings.");
    }

    #[test]
    fn test_rejects_duplicates() {
        let records = vec![
            EmotionRecord::new("sad", vec!["a".into()], "m"),
            EmotionRecord::new("SAD", vec!["b".into()], "m"),
        ];
        let err = KnowledgeBase::from_records(records).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_missing_verses_and_multiword_labels() {
        let no_verse = vec![EmotionRecord::new("sad", vec![], "m")];
        assert!(KnowledgeBase::from_records(no_verse).is_err());

        let multi = vec![EmotionRecord::new("very sad", vec!["a".into()], "m")];
        assert!(KnowledgeBase::from_records(multi).is_err());

        assert!(KnowledgeBase::from_records(vec![]).is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- emotion: hopeful\n  verses: [\"Jeremiah 29:11 - For I know the plans I have for you.\"]\n  message: Hold on."
        )
        .unwrap();

        let kb = KnowledgeBase::from_yaml_file(file.path()).unwrap();
        assert!(kb.contains("hopeful"));
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = KnowledgeBase::from_yaml_file("/nonexistent/kb.yaml").unwrap_err();
        assert!(matches!(err, KnowledgeError::Io { .. }));
    }
}
