//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AuthError, TokenError, ValidationError};

pub use shared::types::response::ErrorResponse;

use thiserror::Error;

/// Core domain errors
///
/// `Repository` is the one unexpected category: the storage call itself
/// failed. Callers may retry those with backoff; everything else is a typed,
/// expected outcome.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Repository error: {message}")]
    Repository { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// True when the error came from the storage layer rather than policy
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DomainError::Repository { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
