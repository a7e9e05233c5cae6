//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};

/// Machine-readable error code reported by the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidApiKey,
    InsufficientQuota,
    RateLimitExceeded,
    ModelNotFound,
    ContextLengthExceeded,
    ServerError,
    Unknown,
}

impl ErrorCode {
    /// Map an OpenAI `error.code` / `error.type` string.
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "invalid_api_key" => Self::InvalidApiKey,
            "insufficient_quota" => Self::InsufficientQuota,
            "rate_limit_exceeded" => Self::RateLimitExceeded,
            "model_not_found" => Self::ModelNotFound,
            "context_length_exceeded" => Self::ContextLengthExceeded,
            "server_error" => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Structured details returned by a provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: Option<ErrorCode>,
    pub provider_code: Option<String>,
    pub param: Option<String>,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    TryAnotherSource,
    ContactSupport,
}

impl RecoverySuggestion {
    /// Short advice for a person at the terminal.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RetryWithBackoff => "wait a moment and ask again",
            Self::CheckCredentials => "check OPENAI_API_KEY",
            Self::CheckConfiguration => "check the config file and WEBSCOUT_* environment variables",
            Self::IncreaseTimeout => "raise the timeout (model_timeout_secs or --fetch-timeout)",
            Self::TryAnotherSource => "try another source or rephrase the question",
            Self::ContactSupport => "see the log output (RUST_LOG=webscout=debug) for details",
        }
    }
}
