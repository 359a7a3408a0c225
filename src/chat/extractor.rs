//! Response extraction: recover `{emotion: {Bible, Message}}` from raw model text.
//!
//! Extraction is an ordered cascade of pure stages, each
//! `&str -> Option<ParsedCompletion>`. A stage yields a mapping only when one
//! of its candidate objects validates; the first stage that yields one wins
//! and later stages are not run.
//!
//! 1. [`fenced_json_block`] - a ```` ```json ```` code fence
//! 2. [`structural_object`] - an object whose first quoted key maps to an object
//! 3. [`greedy_braces`] - everything from the first `{` to the last `}`
//!
//! A candidate that parses but has the wrong shape (a draft, an analysis
//! block) is skipped, so it cannot hide a valid record later in the text.
//! Keys for the verse list and the message are looked up case-insensitively
//! because models vary casing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ExtractionError;
use crate::types::{normalize_label, EmotionRecord, ParsedCompletion};

pub type JsonMap = serde_json::Map<String, Value>;

/// A single extraction stage.
pub type Stage = fn(&str) -> Option<ParsedCompletion>;

/// Outcome of extraction.
pub type ParseResult = Result<ParsedCompletion, ExtractionError>;

/// Default key holding the verse list.
pub const BIBLE_KEY: &str = "Bible";
/// Default key holding the encouragement.
pub const MESSAGE_KEY: &str = "Message";

/// Stages in cascade order.
pub const STAGES: &[(&str, Stage)] = &[
    ("fenced", fenced_json_block),
    ("structural", structural_object),
    ("greedy", greedy_braces),
];

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n(.*?)```").unwrap());
static STRUCTURAL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{\s*"[^"\\]+"\s*:\s*\{"#).unwrap());

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Parse `text` as a JSON object, or nothing.
fn parse_object(text: &str) -> Option<JsonMap> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Parse the first JSON value at the start of `text`, ignoring what follows.
fn parse_object_prefix(text: &str) -> Option<JsonMap> {
    let mut values = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match values.next() {
        Some(Ok(Value::Object(map))) => Some(map),
        _ => None,
    }
}

/// Objects inside ```` ```json ```` fences, in order.
fn fenced_candidates(raw: &str) -> impl Iterator<Item = JsonMap> + '_ {
    FENCED_JSON
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1))
        .filter_map(|body| parse_object(body.as_str()))
}

/// Objects opening with `{"key": {`, each parsed from its own position.
///
/// Every match is tried, including ones nested inside an earlier candidate.
fn structural_candidates(raw: &str) -> impl Iterator<Item = JsonMap> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(m) = STRUCTURAL_START.find_at(raw, pos) {
            pos = m.start() + 1;
            if let Some(map) = parse_object_prefix(&raw[m.start()..]) {
                return Some(map);
            }
        }
        None
    })
}

/// The greediest brace-delimited substring.
fn greedy_candidate(raw: &str) -> Option<JsonMap> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&raw[start..=end])
}

/// First candidate that validates.
fn first_valid(mut candidates: impl Iterator<Item = JsonMap>) -> Option<ParsedCompletion> {
    candidates.find_map(|map| validate(&map).ok())
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Stage 1: the first fenced `json` block holding a well-formed mapping.
pub fn fenced_json_block(raw: &str) -> Option<ParsedCompletion> {
    first_valid(fenced_candidates(raw))
}

/// Stage 2: the first `{"key": {` object holding a well-formed mapping.
pub fn structural_object(raw: &str) -> Option<ParsedCompletion> {
    first_valid(structural_candidates(raw))
}

/// Stage 3: the greediest brace-delimited substring, if well formed.
pub fn greedy_braces(raw: &str) -> Option<ParsedCompletion> {
    first_valid(greedy_candidate(raw).into_iter())
}

/// Run `stages` in order and return the first mapping found with its stage name.
pub fn first_success(
    raw: &str,
    stages: &[(&'static str, Stage)],
) -> Option<(&'static str, ParsedCompletion)> {
    stages
        .iter()
        .find_map(|(name, stage)| stage(raw).map(|parsed| (*name, parsed)))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Case-insensitive key lookup, falling back to the literal key.
pub fn get_ci<'a>(obj: &'a JsonMap, key: &str) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
        .or_else(|| obj.get(key))
}

fn malformed(message: String) -> ExtractionError {
    ExtractionError::Malformed(message)
}

/// Turn one `"emotion": {...}` entry into a record.
fn record_from_entry(key: &str, value: &Value) -> Result<EmotionRecord, ExtractionError> {
    let emotion = normalize_label(key);
    if emotion.is_empty() {
        return Err(malformed("empty emotion key".to_string()));
    }

    let obj = value
        .as_object()
        .ok_or_else(|| malformed(format!("value for '{}' is not an object", key)))?;

    let verses = get_ci(obj, BIBLE_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(format!("'{}' has no {} list", key, BIBLE_KEY)))?
        .iter()
        .map(|v| v.as_str().map(|s| s.trim().to_string()))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| malformed(format!("'{}' has a non-string verse", key)))?;

    let message = get_ci(obj, MESSAGE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("'{}' has no {} string", key, MESSAGE_KEY)))?;

    let record = EmotionRecord::new(emotion, verses, message.trim());
    if !record.is_valid() {
        return Err(malformed(format!("'{}' has an empty {} list", key, BIBLE_KEY)));
    }
    Ok(record)
}

/// Validate a parsed object. Every entry must be well formed.
pub fn validate(map: &JsonMap) -> ParseResult {
    let records = map
        .iter()
        .map(|(key, value)| record_from_entry(key, value))
        .collect::<Result<Vec<_>, _>>()?;

    ParsedCompletion::from_records(records)
        .ok_or_else(|| malformed("object has no emotion keys".to_string()))
}

/// Why no stage produced a mapping: the first candidate's validation error,
/// or [`ExtractionError::NoJson`] when no stage found an object at all.
fn rejection(raw: &str) -> ExtractionError {
    fenced_candidates(raw)
        .chain(structural_candidates(raw))
        .chain(greedy_candidate(raw))
        .find_map(|map| validate(&map).err())
        .unwrap_or(ExtractionError::NoJson)
}

/// Run the cascade.
pub fn extract(raw: &str) -> ParseResult {
    match first_success(raw, STAGES) {
        Some((stage, parsed)) => {
            log::debug!(
                "Extraction stage '{}' found {} emotion(s)",
                stage,
                parsed.len()
            );
            Ok(parsed)
        }
        None => Err(rejection(raw)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
