//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The whole application funnels into three failure classes: an entity that
/// is absent (or no longer actionable), input that fails validation, and a
/// remote collaborator (document store, auth provider) rejecting an
/// operation. Callers present these to the user; nothing here is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The entity id is absent, or the entity is already in a terminal state
    /// that makes the operation meaningless (e.g. a resolved request).
    #[error("not found")]
    NotFound,

    /// A value failed validation (e.g. out-of-range approved quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A remote collaborator rejected the operation (network, permission,
    /// serialization at the wire boundary).
    #[error("remote operation failed: {0}")]
    Remote(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
