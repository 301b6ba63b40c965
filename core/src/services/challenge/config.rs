//! Configuration for the challenge service

use crate::domain::entities::challenge::{
    DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RESENDS, DEFAULT_VALIDITY_MINUTES,
};

/// Configuration for OTP challenge issuance
#[derive(Debug, Clone)]
pub struct ChallengeServiceConfig {
    /// Decimal digits per code
    pub code_length: usize,
    /// Challenge validity in minutes
    pub validity_minutes: i64,
    /// Verification attempts per code set before the challenge fails
    pub max_attempts: u32,
    /// Fresh codes a caller may request for one challenge
    pub max_resends: u32,
}

impl Default for ChallengeServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            validity_minutes: DEFAULT_VALIDITY_MINUTES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_resends: DEFAULT_MAX_RESENDS,
        }
    }
}
