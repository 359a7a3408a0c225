//! Error types for the motivator pipeline.
//!
//! Only [`ServiceError`] is terminal for a request. Extraction errors are
//! recovered by the fallback synthesizer and never reach the user.

use std::path::PathBuf;

use thiserror::Error;

/// Category of a completion-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Transport-level failure (DNS, connection refused, reset).
    Network,
    /// The bounded wait was exceeded.
    Timeout,
    /// Credentials rejected or missing permissions.
    Authentication,
    /// Throttling or service quota exhaustion.
    Quota,
    /// The service rejected the request as malformed.
    InvalidRequest,
    /// The service failed on its side (5xx).
    Upstream,
    /// The service answered but the payload could not be understood.
    InvalidResponse,
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Authentication => "authentication",
            Self::Quota => "quota",
            Self::InvalidRequest => "invalid request",
            Self::Upstream => "upstream",
            Self::InvalidResponse => "invalid response",
        };
        f.write_str(name)
    }
}

/// Failure raised by the completion requester.
#[derive(Debug, Clone, Error)]
#[error("Completion service {kind} error: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
    /// Whether the failure is transient. Throttling is retryable, an
    /// exhausted service quota is not, even though both are `Quota`.
    pub retryable: bool,
}

impl ServiceError {
    /// Create an error with the default retry classification for `kind`.
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        let retryable = matches!(
            kind,
            ServiceErrorKind::Network | ServiceErrorKind::Quota | ServiceErrorKind::Upstream
        );
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    /// Override the retry classification.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Short human-readable summary shown to end users.
    pub fn user_message(&self) -> String {
        match self.kind {
            ServiceErrorKind::Timeout => {
                "The guidance service took too long to answer. Please try again.".to_string()
            }
            ServiceErrorKind::Authentication => {
                "The guidance service rejected our credentials. Please contact the administrator."
                    .to_string()
            }
            ServiceErrorKind::Quota => {
                "The guidance service is busy right now. Please try again shortly.".to_string()
            }
            _ => format!("Error in processing: {}", self.message),
        }
    }
}

/// Reasons the extractor could not produce a parsed completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No stage of the cascade found a JSON object.
    #[error("no JSON object found in completion")]
    NoJson,

    /// A JSON object was found but does not have the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Errors loading or validating a knowledge base.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Startup configuration errors. These are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
