//! Token usage accounting for completion calls.

use serde::{Deserialize, Serialize};

/// Token counters reported by the completion service for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
}

/// Cumulative usage across calls made by one client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total number of tokens used.
    pub total_tokens: i64,
    /// Number of tokens used in prompts.
    pub prompt_tokens: i64,
    /// Number of tokens used in completions.
    pub completion_tokens: i64,
    /// Number of successful requests made.
    pub successful_requests: i64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful request, with its usage when reported.
    pub fn record(&mut self, usage: Option<&TokenUsage>) {
        self.successful_requests += 1;
        if let Some(usage) = usage {
            self.prompt_tokens += usage.input_tokens;
            self.completion_tokens += usage.output_tokens;
            self.total_tokens += usage.total_tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_requests_without_usage() {
        let mut metrics = UsageMetrics::new();
        metrics.record(None);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.total_tokens, 0);
    }

    #[test]
    fn test_record_accumulates() {
        let usage = TokenUsage {
            input_tokens: 40,
            output_tokens: 60,
            total_tokens: 100,
        };
        let mut a = UsageMetrics::new();
        a.record(Some(&usage));
        a.record(Some(&usage));
        assert_eq!(a.successful_requests, 2);
        assert_eq!(a.prompt_tokens, 80);
        assert_eq!(a.completion_tokens, 120);
        assert_eq!(a.total_tokens, 200);
    }

    #[test]
    fn test_token_usage_deserializes_bedrock_shape() {
        let usage: TokenUsage =
            serde_json::from_str(r#"{"inputTokens": 12, "outputTokens": 30, "totalTokens": 42}"#)
                .unwrap();
        assert_eq!(usage.total_tokens, 42);
        assert_eq!(usage.input_tokens, 12);
    }
}
