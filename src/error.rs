//! Error types for resume-optimizer
//!
//! Two layers of errors live here:
//! - [`Error`] covers setup work (loading configuration, building the HTTP client,
//!   reading files from disk, staging previews). These are ordinary `Result` errors.
//! - [`OutcomeError`] is the user-facing outcome of a validation, upload or export
//!   attempt. It is a value carried inside workflow state, tagged with an
//!   [`ErrorKind`] the presentation layer can branch on exhaustively.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for resume-optimizer setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Secondary guidance attached to failures that usually clear up on their own.
///
/// The hosted analysis service sleeps when idle and the first request after a
/// pause can take well over a minute.
pub const WARMING_UP_HINT: &str = "the analysis service may be warming up; try again in a minute";

/// Main error type for resume-optimizer setup operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "service.base_url")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration could not be parsed
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The workflow session has ended and accepts no further commands
    #[error("session closed: not accepting new commands")]
    SessionClosed,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Category of a failed validation, upload or export attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// User-fixable input problem; no network activity happened
    ValidationError,
    /// The deadline elapsed and the operation was cancelled
    NetworkTimeout,
    /// The request reached the service and the service reported a failure
    ServerError,
    /// The service answered but the response could not be understood
    ParseError,
    /// Uncategorized transport fault (connection refused, DNS, TLS, ...)
    UnknownError,
}

impl ErrorKind {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::NetworkTimeout => "network_timeout",
            ErrorKind::ServerError => "server_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Network operation an outcome originated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Resume upload and analysis
    Upload,
    /// Optimized document retrieval
    Export,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Upload => f.write_str("upload"),
            Operation::Export => f.write_str("export"),
        }
    }
}

/// Failed outcome of a validation, upload or export attempt
///
/// `message` is meant to be shown verbatim; `detail`, when present, is secondary
/// guidance (the underlying transport error, or a hint such as [`WARMING_UP_HINT`]).
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct OutcomeError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Optional supplementary information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Operation that produced the error (None for validation failures)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    /// HTTP status, when the service answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl OutcomeError {
    /// Create an error of the given kind with a message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            operation: None,
            status: None,
        }
    }

    /// Input rejected before any network activity
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Deadline elapsed for `operation`
    pub fn timeout(operation: Operation, deadline: Duration) -> Self {
        let elapsed = if deadline.subsec_millis() == 0 {
            format!("{} seconds", deadline.as_secs())
        } else {
            format!("{} ms", deadline.as_millis())
        };
        Self::new(
            ErrorKind::NetworkTimeout,
            format!("{} timed out after {}", operation, elapsed),
        )
        .with_operation(operation)
        .with_detail(WARMING_UP_HINT)
    }

    /// Service reported a failure with the given status
    pub fn server(operation: Operation, status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::ServerError, message)
            .with_operation(operation)
            .with_status(status);
        if matches!(status, 502..=504) {
            err.detail = Some(WARMING_UP_HINT.to_string());
        }
        err
    }

    /// Service answered with a body that could not be understood
    pub fn parse(operation: Operation, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, "the service returned an unexpected response")
            .with_operation(operation)
            .with_detail(detail)
    }

    /// Uncategorized transport fault
    pub fn unknown(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message).with_operation(operation)
    }

    /// Attach supplementary detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the originating operation
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attach the HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Trait for outcomes that can be classified as worth a manual retry or not
///
/// Nothing in this crate retries on its own. Presentation code uses this to decide
/// whether to offer a "try again" action.
pub trait IsRetryable {
    /// Returns true if the failure is transient and resubmitting may succeed
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for OutcomeError {
    fn is_retryable(&self) -> bool {
        match self.kind {
            // The input has to change first
            ErrorKind::ValidationError => false,
            ErrorKind::NetworkTimeout => true,
            // 5xx responses are usually the model or a cold start
            ErrorKind::ServerError => self.status.is_some_and(|s| s >= 500),
            // Same request, same malformed answer
            ErrorKind::ParseError => false,
            ErrorKind::UnknownError => true,
        }
    }
}
