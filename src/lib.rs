//! # Motivator
//!
//! Maps a free-text description of how someone feels to a scripture verse and
//! a short encouragement.
//!
//! A language model names the emotion and proposes a verse; its loosely
//! formatted answer is recovered by an extraction cascade (with heuristic
//! synthesis as the last resort) and reconciled against a small curated
//! knowledge base, whose reviewed entries take precedence over model output.

pub mod chat;
pub mod config;
pub mod errors;
pub mod knowledge;
pub mod llms;
pub mod server;
pub mod types;

pub use chat::{Motivator, MotivatorResponse, ResponseStatus};
pub use config::MotivatorConfig;
pub use errors::{ConfigError, ExtractionError, KnowledgeError, ServiceError, ServiceErrorKind};
pub use knowledge::KnowledgeBase;
pub use llms::{BedrockCompletion, CompletionService};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
