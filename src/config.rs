//! Startup configuration.
//!
//! Loaded once from environment variables and validated before anything is
//! served. Missing credentials or unparseable values are fatal.
//!
//! # Environment Variables
//!
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` (required), `AWS_SESSION_TOKEN`
//! - `AWS_REGION` or `AWS_DEFAULT_REGION` (required)
//! - `MOTIVATOR_MODEL_ID` (default `us.deepseek.r1-v1:0`)
//! - `MOTIVATOR_ENDPOINT` (default: regional Bedrock Runtime endpoint)
//! - `MOTIVATOR_TEMPERATURE`, `MOTIVATOR_MAX_TOKENS`, `MOTIVATOR_TOP_P`, `MOTIVATOR_TOP_K`
//! - `MOTIVATOR_TIMEOUT_SECS` (default 840), `MOTIVATOR_MAX_ATTEMPTS` (default 3)
//! - `MOTIVATOR_MATCH` (`substring` or `exact`)
//! - `MOTIVATOR_KNOWLEDGE_PATH` (YAML knowledge base; built-in table if unset)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::chat::reconciler::MatchStrategy;
use crate::errors::ConfigError;
use crate::knowledge::KnowledgeBase;
use crate::llms::base_llm::InferenceConfig;
use crate::llms::providers::bedrock::{
    AwsCredentials, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL_ID, DEFAULT_TIMEOUT,
};

/// Validated configuration for the pipeline and its completion client.
#[derive(Debug, Clone)]
pub struct MotivatorConfig {
    pub credentials: AwsCredentials,
    pub region: String,
    pub model_id: String,
    /// Endpoint override; `None` means the regional default.
    pub endpoint: Option<String>,
    pub inference: InferenceConfig,
    /// Connect and request timeout.
    pub timeout: Duration,
    pub max_attempts: u32,
    pub match_strategy: MatchStrategy,
    pub knowledge_path: Option<PathBuf>,
}

impl MotivatorConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let credentials = AwsCredentials {
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            session_token: get("AWS_SESSION_TOKEN"),
        };
        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .ok_or(ConfigError::Missing("AWS_REGION"))?;

        let defaults = InferenceConfig::default();
        let inference = InferenceConfig {
            temperature: parse_or(&get, "MOTIVATOR_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "MOTIVATOR_MAX_TOKENS", defaults.max_tokens)?,
            top_p: parse_or(&get, "MOTIVATOR_TOP_P", defaults.top_p)?,
            top_k: parse_opt(&get, "MOTIVATOR_TOP_K")?,
        };
        if !(0.0..=1.0).contains(&inference.top_p) {
            return Err(invalid("MOTIVATOR_TOP_P", inference.top_p, "must be within 0..=1"));
        }
        if inference.temperature < 0.0 {
            return Err(invalid(
                "MOTIVATOR_TEMPERATURE",
                inference.temperature,
                "must not be negative",
            ));
        }
        if inference.max_tokens == 0 {
            return Err(invalid("MOTIVATOR_MAX_TOKENS", 0, "must be positive"));
        }

        let timeout_secs: u64 =
            parse_or(&get, "MOTIVATOR_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(invalid("MOTIVATOR_TIMEOUT_SECS", 0, "must be positive"));
        }
        let max_attempts: u32 = parse_or(&get, "MOTIVATOR_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(invalid("MOTIVATOR_MAX_ATTEMPTS", 0, "must be at least 1"));
        }

        Ok(Self {
            credentials,
            region,
            model_id: get("MOTIVATOR_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            endpoint: get("MOTIVATOR_ENDPOINT"),
            inference,
            timeout: Duration::from_secs(timeout_secs),
            max_attempts,
            match_strategy: parse_or(&get, "MOTIVATOR_MATCH", MatchStrategy::default())?,
            knowledge_path: get("MOTIVATOR_KNOWLEDGE_PATH").map(PathBuf::from),
        })
    }

    /// Load the configured knowledge base, or the built-in curated table.
    pub fn load_knowledge_base(&self) -> Result<KnowledgeBase, crate::errors::KnowledgeError> {
        match &self.knowledge_path {
            Some(path) => KnowledgeBase::from_yaml_file(path),
            None => Ok(KnowledgeBase::curated()),
        }
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_opt<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e.to_string())),
        None => Ok(None),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}
