//! Completion service layer.
//!
//! - [`base_llm`] - the [`CompletionService`] trait and request/response types
//! - [`providers`] - concrete provider implementations (AWS Bedrock)

pub mod base_llm;
pub mod providers;

pub use base_llm::{Completion, CompletionService, InferenceConfig};
pub use providers::bedrock::BedrockCompletion;
