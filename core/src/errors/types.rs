//! Domain-specific error types for authentication operations
//!
//! All variants here are expected, recoverable-by-the-caller outcomes and are
//! returned as typed results. Messages never include plaintext codes, signing
//! keys, or anything that distinguishes "wrong code" from "no such account".

use chrono::{DateTime, Utc};
use thiserror::Error;

use shared::types::response::ErrorResponse;

/// Authentication flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid identifier format")]
    InvalidIdentifier,

    #[error("Invalid verification code")]
    InvalidCode {
        /// Attempts left before the challenge fails, when known
        remaining_attempts: Option<u32>,
    },

    #[error("Challenge expired")]
    ChallengeExpired,

    #[error("No active challenge")]
    ChallengeNotFound,

    #[error("Maximum verification attempts exceeded")]
    AttemptsExhausted,

    #[error("Maximum resends reached")]
    ResendLimitExceeded,

    #[error("Rate limit exceeded")]
    RateLimited {
        /// When the limiting window expires
        resets_at: DateTime<Utc>,
    },

    #[error("Identifier is suppressed: {reason}")]
    Blocked { reason: String },

    #[error("Delivery provider failure")]
    DeliveryFailure,
}

/// Magic link token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid token claims")]
    InvalidClaims,

    #[error("Token already redeemed")]
    TokenReplayed,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Input validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl AuthError {
    /// Stable machine-readable code for this error
    ///
    /// `InvalidCode` and `ChallengeNotFound` intentionally share one code so
    /// responses cannot reveal whether an identifier has an active challenge.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidIdentifier => "INVALID_IDENTIFIER",
            AuthError::InvalidCode { .. } => "VERIFICATION_FAILED",
            AuthError::ChallengeNotFound => "VERIFICATION_FAILED",
            AuthError::ChallengeExpired => "CHALLENGE_EXPIRED",
            AuthError::AttemptsExhausted => "MAX_ATTEMPTS_EXCEEDED",
            AuthError::ResendLimitExceeded => "RESEND_LIMIT_EXCEEDED",
            AuthError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            AuthError::Blocked { .. } => "IDENTIFIER_BLOCKED",
            AuthError::DeliveryFailure => "DELIVERY_FAILURE",
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        let code = err.error_code();
        let response = ErrorResponse::new(code, err.to_string());
        match err {
            AuthError::InvalidCode {
                remaining_attempts: Some(remaining),
            } => response.add_detail("remaining_attempts", remaining),
            AuthError::RateLimited { resets_at } => response.add_detail("resets_at", resets_at),
            _ => response,
        }
    }
}

impl From<TokenError> for ErrorResponse {
    fn from(err: TokenError) -> Self {
        let error_code = match &err {
            TokenError::TokenExpired => "TOKEN_EXPIRED",
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            TokenError::InvalidClaims => "INVALID_CLAIMS",
            TokenError::TokenReplayed => "TOKEN_REPLAYED",
            TokenError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        let error_code = match &err {
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationError::InvalidLength { .. } => "INVALID_LENGTH",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_code_and_not_found_share_code() {
        let invalid = AuthError::InvalidCode {
            remaining_attempts: Some(2),
        };
        let not_found = AuthError::ChallengeNotFound;
        assert_eq!(invalid.error_code(), not_found.error_code());
    }

    #[test]
    fn test_invalid_code_carries_remaining_attempts() {
        let response: ErrorResponse = AuthError::InvalidCode {
            remaining_attempts: Some(1),
        }
        .into();
        assert_eq!(response.error, "VERIFICATION_FAILED");
        assert_eq!(response.details.unwrap()["remaining_attempts"], 1);
    }

    #[test]
    fn test_rate_limited_carries_reset_time() {
        let resets_at = Utc::now();
        let response: ErrorResponse = AuthError::RateLimited { resets_at }.into();
        assert_eq!(response.error, "RATE_LIMIT_EXCEEDED");
        assert!(response.details.unwrap().contains_key("resets_at"));
    }

    #[test]
    fn test_token_error_conversion() {
        let response: ErrorResponse = TokenError::TokenReplayed.into();
        assert_eq!(response.error, "TOKEN_REPLAYED");
    }
}
