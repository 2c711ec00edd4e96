//! Unified application error types.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The referenced task or device does not exist.
    NotFound,
    /// Malformed input (unknown task type, bad identifier, bad limits).
    InvalidArgument,
    /// The operation is not legal in the task's current status.
    InvalidState,
    /// A manual retry was requested but the retry cap has been reached.
    RetriesExhausted,
    /// The storage layer failed or could not be reached.
    PersistenceUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Return the machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidState => "INVALID_STATE",
            Self::RetriesExhausted => "RETRIES_EXHAUSTED",
            Self::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }

    /// Whether this kind is a business-rule violation rather than an
    /// infrastructure failure.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::InvalidArgument | Self::InvalidState | Self::RetriesExhausted
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Create a retries-exhausted error.
    pub fn retries_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RetriesExhausted, message)
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PersistenceUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Only storage failures may be retried transparently by a caller.
    /// Business-rule errors are final.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::PersistenceUnavailable
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(
            ErrorKind::PersistenceUnavailable,
            format!("Database error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persistence_is_retryable() {
        assert!(AppError::persistence("down").is_retryable());
        assert!(!AppError::not_found("missing").is_retryable());
        assert!(!AppError::invalid_state("running").is_retryable());
        assert!(!AppError::retries_exhausted("cap").is_retryable());
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::invalid_argument("unknown task type 'foo'");
        assert_eq!(
            err.to_string(),
            "INVALID_ARGUMENT: unknown task type 'foo'"
        );
    }

    #[test]
    fn test_business_rule_classification() {
        assert!(ErrorKind::RetriesExhausted.is_business_rule());
        assert!(!ErrorKind::PersistenceUnavailable.is_business_rule());
        assert!(!ErrorKind::Internal.is_business_rule());
    }
}
