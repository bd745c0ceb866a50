//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic business failure.
///
/// Only domain outcomes live here: bad input, a broken lifecycle rule, a
/// missing or colliding record. Transport and storage failures stay in the
/// backend client's own error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (blank name, malformed VIN, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A lifecycle or consistency rule was broken.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier string did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed row or record does not exist.
    #[error("not found")]
    NotFound,

    /// The operation collides with existing state (duplicate entry,
    /// already-terminal lifecycle).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
