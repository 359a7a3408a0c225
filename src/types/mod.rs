//! Shared data types.

pub mod emotion_record;
pub mod parsed_completion;
pub mod usage_metrics;

pub use emotion_record::{normalize_label, EmotionRecord};
pub use parsed_completion::ParsedCompletion;
pub use usage_metrics::{TokenUsage, UsageMetrics};
