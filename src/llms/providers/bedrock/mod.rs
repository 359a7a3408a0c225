//! AWS Bedrock completion provider.
//!
//! Talks to the Bedrock Runtime Converse API directly over `reqwest`, signing
//! each request with SigV4.
//!
//! # Features
//!
//! - Converse API (`POST /model/{modelId}/converse`)
//! - Connect and total-request timeouts
//! - Retry with exponential backoff on throttling, 5xx and transport errors
//! - No retry on authentication, validation or timeout failures
//! - Token usage logging and cumulative tracking
//!
//! # Environment Variables
//!
//! See [`MotivatorConfig`](crate::config::MotivatorConfig).

pub mod sigv4;

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::MotivatorConfig;
use crate::errors::{ServiceError, ServiceErrorKind};
use crate::llms::base_llm::{Completion, CompletionService, InferenceConfig};
use crate::types::{TokenUsage, UsageMetrics};

pub use sigv4::AwsCredentials;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// SigV4 service name for Bedrock Runtime.
pub const SIGNING_SERVICE: &str = "bedrock";

/// Default model: DeepSeek R1 via cross-region inference profile.
pub const DEFAULT_MODEL_ID: &str = "us.deepseek.r1-v1:0";

/// Historical upstream latency for reasoning models is several minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(840);

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// BedrockCompletion provider
// ---------------------------------------------------------------------------

/// Bedrock Converse client. One instance is built at startup and shared.
#[derive(Debug)]
pub struct BedrockCompletion {
    /// Bedrock model or inference-profile ID.
    pub model_id: String,
    /// AWS region used for signing and the default endpoint.
    pub region: String,
    /// Base URL without trailing slash.
    pub endpoint: String,
    /// Sampling parameters.
    pub inference: InferenceConfig,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_base_delay: Duration,
    /// Fold the instruction into the user turn instead of the `system` field.
    /// Reasoning models such as DeepSeek R1 reject a separate system block.
    pub system_in_user_turn: bool,
    credentials: AwsCredentials,
    client: reqwest::Client,
    usage: Mutex<UsageMetrics>,
}

impl BedrockCompletion {
    /// Create a provider with default inference and retry settings.
    ///
    /// `timeout` bounds both connection setup and the whole request.
    pub fn new(
        model_id: impl Into<String>,
        region: impl Into<String>,
        credentials: AwsCredentials,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let region = region.into();
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ServiceError::new(
                    ServiceErrorKind::Network,
                    format!("failed to build HTTP client: {}", e),
                )
                .with_retryable(false)
            })?;

        Ok(Self {
            model_id: model_id.into(),
            endpoint: default_endpoint(&region),
            region,
            inference: InferenceConfig::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_secs(1),
            system_in_user_turn: true,
            credentials,
            client,
            usage: Mutex::new(UsageMetrics::new()),
        })
    }

    /// Build the provider from validated startup configuration.
    pub fn from_config(config: &MotivatorConfig) -> Result<Self, ServiceError> {
        let mut provider = Self::new(
            config.model_id.clone(),
            config.region.clone(),
            config.credentials.clone(),
            config.timeout,
        )?;
        if let Some(endpoint) = &config.endpoint {
            provider = provider.with_endpoint(endpoint);
        }
        provider.inference = config.inference.clone();
        provider.max_attempts = config.max_attempts;
        Ok(provider)
    }

    /// Point the client at a custom endpoint (VPC endpoint, proxy, tests).
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        self.endpoint = endpoint.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Encoded request path for the Converse API.
    pub fn converse_path(&self) -> String {
        format!("/model/{}/converse", sigv4::uri_encode(&self.model_id))
    }

    /// Build the Converse request body.
    pub fn build_request_body(&self, system_prompt: &str, user_statement: &str) -> Value {
        let user_text = if self.system_in_user_turn {
            format!("{}\n\nUser: {}", system_prompt, user_statement)
        } else {
            user_statement.to_string()
        };

        let mut body = serde_json::json!({
            "messages": [
                { "role": "user", "content": [{ "text": user_text }] }
            ],
            "inferenceConfig": {
                "temperature": self.inference.temperature,
                "maxTokens": self.inference.max_tokens,
                "topP": self.inference.top_p,
            },
        });

        if !self.system_in_user_turn {
            body["system"] = serde_json::json!([{ "text": system_prompt }]);
        }

        // top_k is not part of the common inferenceConfig
        if let Some(top_k) = self.inference.top_k {
            body["additionalModelRequestFields"] = serde_json::json!({ "top_k": top_k });
        }

        body
    }

    /// Parse a Converse response into a [`Completion`].
    fn parse_response(&self, response: &Value) -> Result<Completion, ServiceError> {
        let content = response
            .pointer("/output/message/content")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ServiceError::new(
                    ServiceErrorKind::InvalidResponse,
                    "Received invalid response from model: no output message",
                )
            })?;

        // Reasoning models emit `reasoningContent` blocks before the answer.
        let text: String = content
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();

        let stop_reason = response
            .get("stopReason")
            .and_then(Value::as_str)
            .map(str::to_string);

        // The call succeeded; an empty answer is left to extraction and synthesis.
        if text.trim().is_empty() {
            log::warn!(
                "Bedrock returned no text content (stopReason={})",
                stop_reason.as_deref().unwrap_or("unknown")
            );
        }

        let usage = response
            .get("usage")
            .and_then(|u| serde_json::from_value::<TokenUsage>(u.clone()).ok());

        match &usage {
            Some(u) => log::info!(
                "Bedrock token usage: inputTokens={}, outputTokens={}, totalTokens={}",
                u.input_tokens,
                u.output_tokens,
                u.total_tokens
            ),
            None => log::info!("Bedrock token usage: N/A"),
        }

        Ok(Completion {
            text,
            usage,
            stop_reason,
        })
    }

    fn host_header(&self, url: &reqwest::Url) -> Result<String, ServiceError> {
        let host = url.host_str().ok_or_else(|| {
            ServiceError::new(
                ServiceErrorKind::InvalidRequest,
                format!("endpoint {} has no host", self.endpoint),
            )
        })?;
        Ok(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// One signed attempt.
    async fn send_once(&self, payload: &[u8]) -> Result<Completion, ServiceError> {
        let path = self.converse_path();
        let url = reqwest::Url::parse(&format!("{}{}", self.endpoint, path)).map_err(|e| {
            ServiceError::new(
                ServiceErrorKind::InvalidRequest,
                format!("invalid endpoint {}: {}", self.endpoint, e),
            )
        })?;
        let host = self.host_header(&url)?;

        let signed = sigv4::sign(
            &sigv4::SigningRequest {
                method: "POST",
                path: &path,
                headers: &[("content-type", "application/json"), ("host", host.as_str())],
                payload,
            },
            &self.credentials,
            &self.region,
            SIGNING_SERVICE,
            chrono::Utc::now(),
        );

        let mut request = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request
            .body(payload.to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_error(status, error_type.as_deref(), &text));
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            ServiceError::new(
                ServiceErrorKind::InvalidResponse,
                format!(
                    "failed to parse Bedrock response: {} - Body: {}",
                    e,
                    truncate(&text, 500)
                ),
            )
        })?;

        self.parse_response(&json)
    }
}

#[async_trait]
impl CompletionService for BedrockCompletion {
    fn model(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &str {
        "bedrock"
    }

    async fn request(
        &self,
        system_prompt: &str,
        user_statement: &str,
    ) -> Result<Completion, ServiceError> {
        let body = self.build_request_body(system_prompt, user_statement);
        let payload = serde_json::to_vec(&body).map_err(|e| {
            ServiceError::new(ServiceErrorKind::InvalidRequest, e.to_string())
        })?;

        log::debug!(
            "BedrockCompletion.request: model={}, region={}, bytes={}",
            self.model_id,
            self.region,
            payload.len()
        );

        let attempts = self.max_attempts.max(1);
        let mut retry_delay = self.retry_base_delay;
        let mut last_error: Option<ServiceError> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                log::warn!(
                    "Bedrock retry attempt {}/{} after {:?}",
                    attempt,
                    attempts,
                    retry_delay
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            match self.send_once(&payload).await {
                Ok(completion) => {
                    self.usage.lock().record(completion.usage.as_ref());
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() => {
                    log::warn!("Bedrock API error (attempt {}): {}", attempt, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    log::error!("Bedrock API error: {}", e);
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ServiceError::new(
                ServiceErrorKind::Network,
                "Bedrock call failed after all retries",
            )
        }))
    }

    fn usage_summary(&self) -> UsageMetrics {
        self.usage.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::new(ServiceErrorKind::Timeout, format!("request timed out: {}", e))
    } else {
        ServiceError::new(ServiceErrorKind::Network, e.to_string())
    }
}

/// Map an error response to a [`ServiceError`].
///
/// `error_type` is the `x-amzn-errortype` header, which may carry a
/// `:http://...` suffix.
fn classify_error(status: StatusCode, error_type: Option<&str>, body: &str) -> ServiceError {
    let error_type = error_type.map(|t| t.split(':').next().unwrap_or(t));
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate(body, 500));
    let detail = format!(
        "{} ({}): {}",
        error_type.unwrap_or("HTTP error"),
        status.as_u16(),
        message
    );

    match (status.as_u16(), error_type) {
        (_, Some("ServiceQuotaExceededException")) => {
            ServiceError::new(ServiceErrorKind::Quota, detail).with_retryable(false)
        }
        (429, _) | (_, Some("ThrottlingException")) => {
            ServiceError::new(ServiceErrorKind::Quota, detail)
        }
        (401 | 403, _)
        | (_, Some("AccessDeniedException"))
        | (_, Some("UnrecognizedClientException")) => {
            ServiceError::new(ServiceErrorKind::Authentication, detail)
        }
        (408, _) | (_, Some("ModelTimeoutException")) => {
            ServiceError::new(ServiceErrorKind::Timeout, detail)
        }
        (s, _) if s >= 500 => ServiceError::new(ServiceErrorKind::Upstream, detail),
        _ => ServiceError::new(ServiceErrorKind::InvalidRequest, detail),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
