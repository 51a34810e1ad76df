//! Error types for atelier-core
//!
//! The taxonomy is intentionally small. Callers that lack access to a
//! resource receive the same `NotFound` as callers asking for a resource
//! that does not exist.

use serde::Serialize;
use thiserror::Error;

/// A single offending input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path of the field (e.g. `props.asset_id`)
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldIssue {
    /// Create a new field issue
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, malformed, expired or otherwise invalid credential
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource absent, invisible to the caller, or in the wrong lifecycle state
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input or violated business rule
    #[error("validation failed: {message}")]
    Validation {
        /// Summary message
        message: String,
        /// Offending fields, when derivable
        details: Vec<FieldIssue>,
    },

    /// Storage failure
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unauthenticated error
    #[must_use]
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error without field details
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            details: Vec::new(),
        }
    }

    /// Create a validation error pointing at a single field
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let issue = FieldIssue::new(field, msg);
        Self::Validation {
            message: issue.message.clone(),
            details: vec![issue],
        }
    }

    /// Create a database error
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an internal error
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error is safe to show to the caller verbatim
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated(_) | Self::NotFound(_) | Self::Validation { .. }
        )
    }

    /// Get error code for API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::Validation { .. } => "validation_failed",
            Self::Database(_) => "database_error",
            Self::Serialization(_) => "serialization_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::not_found("file").code(), "not_found");
        assert_eq!(Error::unauthenticated("token").code(), "unauthenticated");
        assert_eq!(Error::validation("bad").code(), "validation_failed");
        assert_eq!(Error::database("down").code(), "database_error");
    }

    #[test]
    fn test_invalid_field_carries_detail() {
        let err = Error::invalid_field("name", "name is required");
        match err {
            Error::Validation { message, details } => {
                assert_eq!(message, "name is required");
                assert_eq!(details, vec![FieldIssue::new("name", "name is required")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::not_found("x").is_client_error());
        assert!(Error::validation("x").is_client_error());
        assert!(!Error::database("x").is_client_error());
        assert!(!Error::internal("x").is_client_error());
    }

    #[test]
    fn test_from_serde_error() {
        let result: std::result::Result<i32, serde_json::Error> = serde_json::from_str("nope");
        let err: Error = result.unwrap_err().into();
        assert_eq!(err.code(), "serialization_error");
    }
}
