//! Intent reconciliation: choose between curated and model-generated content.
//!
//! Curated knowledge-base entries win whenever any detected emotion matches a
//! curated label; the first matching label in knowledge-base order is used.
//! Otherwise the first parsed emotion and the model's own verse and message
//! are returned.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeBase;
use crate::types::ParsedCompletion;

/// How detected emotions are compared with curated labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// A curated label matches if it occurs anywhere in the joined detected
    /// labels, so `"joyful, excited"` matches `excited`. Also matches inside
    /// longer words (`"overexcited"`).
    #[default]
    Substring,
    /// A curated label matches only a detected label equal to it.
    Exact,
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" | "loose" => Ok(Self::Substring),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown match strategy '{}', expected substring or exact", other)),
        }
    }
}

/// Where the surfaced content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Curated,
    Model,
}

/// The triple surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub emotion: String,
    pub verse: String,
    pub message: String,
    pub source: ResponseSource,
}

/// Reconcile with the default (substring) strategy.
pub fn reconcile(parsed: &ParsedCompletion, kb: &KnowledgeBase) -> Reconciliation {
    reconcile_with(parsed, kb, MatchStrategy::Substring)
}

/// Reconcile using `strategy` to compare labels.
pub fn reconcile_with(
    parsed: &ParsedCompletion,
    kb: &KnowledgeBase,
    strategy: MatchStrategy,
) -> Reconciliation {
    let joined = parsed.joined_emotions();

    let curated = kb.iter().find(|entry| match strategy {
        MatchStrategy::Substring => joined.contains(entry.emotion.as_str()),
        MatchStrategy::Exact => parsed.emotions().any(|e| e == entry.emotion),
    });

    if let Some(entry) = curated {
        log::debug!(
            "Curated entry '{}' matched detected emotions [{}]",
            entry.emotion,
            joined
        );
        return Reconciliation {
            emotion: entry.emotion.clone(),
            verse: entry.verse_text(),
            message: entry.message.clone(),
            source: ResponseSource::Curated,
        };
    }

    let primary = parsed.primary();
    log::debug!(
        "No curated entry for [{}]; using model content for '{}'",
        joined,
        primary.emotion
    );
    Reconciliation {
        emotion: primary.emotion.clone(),
        verse: primary.verse_text(),
        message: primary.message.clone(),
        source: ResponseSource::Model,
    }
}
