//! Unified application error types for MeetHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.
//!
//! Capacity exhaustion is deliberately *not* an error kind: a full session
//! produces a waitlisted reservation, which is a success outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error kind categorization used across the entire engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested entity was not found.
    NotFound,
    /// Input validation failed (time ordering, malformed request).
    Validation,
    /// A conflict occurred (already reserved, already connected, location overlap).
    Conflict,
    /// A rolling-window quota was exhausted.
    RateLimited,
    /// The target's privacy settings disallow the action.
    Forbidden,
    /// Capacity accounting contradicted itself. Never expected in correct
    /// operation; signals a bug in the capacity tracker, not a user error.
    InternalConsistency,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::InternalConsistency => write!(f, "INTERNAL_CONSISTENCY"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout MeetHub.
///
/// All internal errors are mapped into `AppError` using constructor
/// helpers or explicit `.map_err()` calls. This provides a single error
/// type for the entire engine boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// For [`ErrorKind::RateLimited`], the earliest instant at which the
    /// rolling window will admit one more unit.
    pub retry_at: Option<DateTime<Utc>>,
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
            retry_at: None,
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
            retry_at: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a rate-limited error carrying the earliest retry instant.
    pub fn rate_limited(message: impl Into<String>, retry_at: DateTime<Utc>) -> Self {
        Self {
            kind: ErrorKind::RateLimited,
            message: message.into(),
            retry_at: Some(retry_at),
            source: None,
        }
    }

    /// Create an internal-consistency error.
    pub fn internal_consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalConsistency, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retry_at: self.retry_at,
            source: None,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::RateLimited.to_string(), "RATE_LIMITED");
        assert_eq!(ErrorKind::InternalConsistency.to_string(), "INTERNAL_CONSISTENCY");
    }

    #[test]
    fn test_rate_limited_carries_retry_at() {
        let retry = Utc::now();
        let err = AppError::rate_limited("daily connection quota exhausted", retry);
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.retry_at, Some(retry));
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::with_source(
            ErrorKind::Internal,
            "wrapped",
            std::io::Error::new(std::io::ErrorKind::Other, "inner"),
        );
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.message, "wrapped");
    }
}
