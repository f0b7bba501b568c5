/*!
 * Error types for the subctx application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use serde_json::Value;
use thiserror::Error;

/// Classification of a failed translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response could be obtained from the endpoint
    Network,

    /// The endpoint answered with a non-success HTTP status
    Provider {
        /// HTTP status code
        status: u16,
    },

    /// A success response whose body is not valid JSON
    InvalidJson,

    /// Chat response without a `choices` field
    MalformedResponse,

    /// Chat response with an empty `choices` list
    EmptyResponse,

    /// Chat response whose first choice carries no content
    NoContent,
}

/// The single error surfaced to callers of the translation pipeline.
///
/// Carries a human-readable message and, when the provider sent one,
/// the raw JSON error payload.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    /// What went wrong
    pub kind: ApiErrorKind,

    /// Human-readable message, taken from the provider when available
    pub message: String,

    /// Raw response or error payload
    pub payload: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    /// Attach the raw payload the error was derived from
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Transport failure with the generic message used once retries are exhausted
    pub fn network(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = if reason.is_empty() {
            "Network error".to_string()
        } else {
            format!("Network error: {}", reason)
        };
        Self::new(ApiErrorKind::Network, message)
    }

    /// Whether the retry policy may try the request again
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network | ApiErrorKind::Provider { .. })
    }

    /// HTTP status of a provider error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Provider { status } => Some(status),
            _ => None,
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its accepted range
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Config key
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The input held no usable subtitle blocks
    #[error("No subtitle entries found in {0}")]
    NoEntries(String),

    /// A timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a translation request
    #[error("Translation failed: {0}")]
    Api(#[from] ApiError),

    /// Error from configuration handling
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
