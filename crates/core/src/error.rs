//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is scoped to a single request; none of them is fatal to the
/// process. The HTTP layer maps each variant to exactly one status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent or blank (400).
    #[error("{0}")]
    MissingField(String),

    /// A field was present but malformed (400).
    #[error("{0}")]
    Validation(String),

    /// A field was present but failed a content rule, e.g. password policy (422).
    #[error("{0}")]
    PolicyViolation(String),

    /// A uniqueness constraint was violated (409).
    #[error("{0}")]
    Conflict(String),

    /// Submitted credentials did not match the stored ones (401).
    #[error("Invalid email or password")]
    InvalidCredential,

    /// No valid session token accompanied the request (401).
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but does not own the resource (403).
    #[error("{0}")]
    Forbidden(String),

    /// The requested resource does not exist (404).
    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingField(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
