//! Completion service abstraction.
//!
//! The pipeline only needs one operation from a language model: send a fixed
//! instruction plus the user's statement and get raw text back. Providers
//! implement [`CompletionService`]; the pipeline holds an
//! `Arc<dyn CompletionService>` constructed once at startup.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::types::{TokenUsage, UsageMetrics};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Sampling randomness.
    pub temperature: f64,
    /// Output length cap.
    pub max_tokens: u32,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Candidate pool size, for models that accept it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_tokens: 512,
            top_p: 0.9,
            top_k: None,
        }
    }
}

/// Raw model output plus whatever accounting the service reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Unstructured output text.
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub stop_reason: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A remote text-completion endpoint.
#[async_trait]
pub trait CompletionService: Send + Sync + fmt::Debug {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Provider name, for logs and health output.
    fn provider(&self) -> &str;

    /// Send `system_prompt` and `user_statement` and return the raw completion.
    ///
    /// Implementations must bound the wait and surface failures as
    /// [`ServiceError`]; they retry transient failures themselves.
    async fn request(
        &self,
        system_prompt: &str,
        user_statement: &str,
    ) -> Result<Completion, ServiceError>;

    /// Cumulative token usage for this client.
    fn usage_summary(&self) -> UsageMetrics {
        UsageMetrics::default()
    }
}
