//! Challenge repository trait defining persistence for OTP challenges.
//!
//! The two conditional operations (`verify_and_consume`,
//! `record_failed_attempt`) are the only places a race is a security bug:
//! implementations must express them as single atomic conditional writes
//! (a conditional UPDATE, a Redis script, a compare-and-swap), never as
//! separate read-then-write steps.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::challenge::OtpChallenge;
use crate::errors::DomainError;

/// Repository contract for OTP challenge persistence
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Persist a new challenge; fails if the id already exists
    async fn create(&self, challenge: OtpChallenge) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError>;

    /// The newest pending, unexpired challenge for an identifier, if any
    async fn find_active_by_identifier(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<OtpChallenge>, DomainError>;

    /// Atomically transition to verified iff the challenge is pending,
    /// unexpired, and `code_hash` matches the stored hash
    ///
    /// Under N concurrent calls with the correct code exactly one returns
    /// `true`; every other outcome is a no-op `false`.
    async fn verify_and_consume(&self, id: Uuid, code_hash: &str) -> Result<bool, DomainError>;

    /// Atomically increment the attempt counter, returning the new count
    async fn record_failed_attempt(&self, id: Uuid) -> Result<u32, DomainError>;

    /// Transition a pending challenge to failed; `false` if not pending
    async fn mark_failed(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Transition a pending challenge to expired; `false` if not pending
    async fn mark_expired(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Replace the code hash for a resend iff the challenge is pending,
    /// unexpired, and under its resend cap; resets the attempt counter
    async fn apply_resend(&self, id: Uuid, new_code_hash: &str) -> Result<bool, DomainError>;

    /// Remove a challenge row; `false` if absent
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError>;
}
