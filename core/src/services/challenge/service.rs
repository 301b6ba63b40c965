//! OTP challenge lifecycle management
//!
//! Issuance, verification, and resend against the challenge repository.
//! Verification success goes through the store's atomic
//! `verify_and_consume`, so exactly one of any number of concurrent
//! correct submissions wins; this service only interprets the outcome.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::challenge::{AuthIntent, Channel, ChallengeStatus, OtpChallenge};
use crate::errors::{AuthError, DomainResult};
use crate::repositories::ChallengeRepository;

use super::config::ChallengeServiceConfig;

/// A freshly issued challenge together with its plaintext code
///
/// The plaintext exists only to be handed to the delivery provider; it is
/// never persisted and must not be logged.
#[derive(Debug)]
pub struct IssuedChallenge {
    pub challenge: OtpChallenge,
    pub plaintext_code: String,
}

/// Service managing the OTP challenge lifecycle
pub struct ChallengeService<R: ChallengeRepository> {
    repository: Arc<R>,
    config: ChallengeServiceConfig,
}

impl<R: ChallengeRepository> ChallengeService<R> {
    pub fn new(repository: Arc<R>, config: ChallengeServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Issue a new challenge with a generated code
    pub async fn issue(
        &self,
        identifier_hash: &str,
        channel: Channel,
        intent: AuthIntent,
    ) -> DomainResult<IssuedChallenge> {
        let plaintext_code = OtpChallenge::generate_code(self.config.code_length);
        let challenge = OtpChallenge::new(
            identifier_hash.to_string(),
            channel,
            intent,
            &plaintext_code,
            self.config.validity_minutes,
            self.config.max_attempts,
            self.config.max_resends,
        );
        self.repository.create(challenge.clone()).await?;

        info!(
            challenge_id = %challenge.id,
            channel = channel.as_str(),
            intent = intent.as_str(),
            event = "challenge_issued",
            "Challenge issued"
        );

        Ok(IssuedChallenge {
            challenge,
            plaintext_code,
        })
    }

    /// Issue a challenge backed by a caller-supplied secret
    ///
    /// Used by the magic link flow, where the secret is the token id and
    /// validity follows the token's lifetime rather than the OTP default.
    pub async fn issue_with_code(
        &self,
        identifier_hash: &str,
        channel: Channel,
        intent: AuthIntent,
        plaintext_code: &str,
        validity_minutes: i64,
    ) -> DomainResult<OtpChallenge> {
        let challenge = OtpChallenge::new(
            identifier_hash.to_string(),
            channel,
            intent,
            plaintext_code,
            validity_minutes,
            self.config.max_attempts,
            self.config.max_resends,
        );
        self.repository.create(challenge.clone()).await?;

        info!(
            challenge_id = %challenge.id,
            channel = channel.as_str(),
            intent = intent.as_str(),
            event = "challenge_issued",
            "Challenge issued"
        );

        Ok(challenge)
    }

    /// The newest pending, unexpired challenge for an identifier
    pub async fn find_active(
        &self,
        identifier_hash: &str,
    ) -> DomainResult<Option<OtpChallenge>> {
        self.repository.find_active_by_identifier(identifier_hash).await
    }

    /// Verify a submitted code against a challenge
    ///
    /// The happy path is one atomic consume. On a miss the attempt counter
    /// is incremented and the challenge fails once attempts are exhausted.
    /// A consumed or unknown challenge reports the same error, so callers
    /// cannot distinguish "already used" from "never existed".
    pub async fn verify(
        &self,
        challenge_id: Uuid,
        submitted_code: &str,
    ) -> DomainResult<OtpChallenge> {
        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;

        match challenge.status {
            ChallengeStatus::Pending => {}
            ChallengeStatus::Expired => return Err(AuthError::ChallengeExpired.into()),
            ChallengeStatus::Failed => return Err(AuthError::AttemptsExhausted.into()),
            ChallengeStatus::Verified => return Err(AuthError::ChallengeNotFound.into()),
        }

        if challenge.is_expired() {
            // Lazy transition; correctness never depends on a sweep job
            self.repository.mark_expired(challenge_id).await?;
            return Err(AuthError::ChallengeExpired.into());
        }

        let code_hash = OtpChallenge::hash_code(submitted_code);
        if self
            .repository
            .verify_and_consume(challenge_id, &code_hash)
            .await?
        {
            info!(
                challenge_id = %challenge_id,
                event = "challenge_verified",
                "Challenge verified"
            );
            return self
                .repository
                .find_by_id(challenge_id)
                .await?
                .ok_or(AuthError::ChallengeNotFound.into());
        }

        self.handle_failed_consume(challenge_id).await
    }

    /// Verify a submitted code against the identifier's active challenge
    pub async fn verify_by_identifier(
        &self,
        identifier_hash: &str,
        submitted_code: &str,
    ) -> DomainResult<OtpChallenge> {
        let challenge = self
            .repository
            .find_active_by_identifier(identifier_hash)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;
        self.verify(challenge.id, submitted_code).await
    }

    /// Issue a fresh code for an existing challenge
    ///
    /// The previous code stops working and the attempt counter resets. The
    /// resend cap is enforced by the store's conditional update, so
    /// concurrent resends cannot exceed it.
    pub async fn resend(&self, challenge_id: Uuid) -> DomainResult<IssuedChallenge> {
        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;

        if challenge.status.is_terminal() {
            return Err(AuthError::ChallengeNotFound.into());
        }
        if challenge.is_expired() {
            self.repository.mark_expired(challenge_id).await?;
            return Err(AuthError::ChallengeExpired.into());
        }

        let plaintext_code = OtpChallenge::generate_code(self.config.code_length);
        let new_code_hash = OtpChallenge::hash_code(&plaintext_code);
        if !self
            .repository
            .apply_resend(challenge_id, &new_code_hash)
            .await?
        {
            warn!(
                challenge_id = %challenge_id,
                event = "resend_limit",
                "Resend refused"
            );
            return Err(AuthError::ResendLimitExceeded.into());
        }

        info!(
            challenge_id = %challenge_id,
            event = "challenge_resent",
            "Challenge code reissued"
        );

        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;
        Ok(IssuedChallenge {
            challenge,
            plaintext_code,
        })
    }

    /// Interpret a failed atomic consume
    ///
    /// Either the code was wrong, or a concurrent caller consumed the
    /// challenge between our read and the consume. Re-reading settles it.
    async fn handle_failed_consume(&self, challenge_id: Uuid) -> DomainResult<OtpChallenge> {
        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .ok_or(AuthError::ChallengeNotFound)?;

        match challenge.status {
            ChallengeStatus::Pending if challenge.is_expired() => {
                self.repository.mark_expired(challenge_id).await?;
                Err(AuthError::ChallengeExpired.into())
            }
            ChallengeStatus::Pending => {
                let attempts = self.repository.record_failed_attempt(challenge_id).await?;
                if attempts >= challenge.max_attempts {
                    self.repository.mark_failed(challenge_id).await?;
                    warn!(
                        challenge_id = %challenge_id,
                        attempts = attempts,
                        event = "attempts_exhausted",
                        "Challenge failed after too many attempts"
                    );
                    Err(AuthError::AttemptsExhausted.into())
                } else {
                    Err(AuthError::InvalidCode {
                        remaining_attempts: Some(challenge.max_attempts - attempts),
                    }
                    .into())
                }
            }
            ChallengeStatus::Expired => Err(AuthError::ChallengeExpired.into()),
            ChallengeStatus::Failed => Err(AuthError::AttemptsExhausted.into()),
            ChallengeStatus::Verified => Err(AuthError::ChallengeNotFound.into()),
        }
    }
}
