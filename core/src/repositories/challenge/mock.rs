//! In-memory implementation of ChallengeRepository for testing
//!
//! Every conditional operation runs under a single write-lock acquisition,
//! which preserves the atomicity contract the trait demands of real stores.

use async_trait::async_trait;
use chrono::Utc;
use constant_time_eq::constant_time_eq;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::challenge::{ChallengeStatus, OtpChallenge};
use crate::errors::DomainError;

use super::trait_::ChallengeRepository;

/// Mock challenge repository backed by a `HashMap`
#[derive(Default)]
pub struct MockChallengeRepository {
    challenges: Arc<RwLock<HashMap<Uuid, OtpChallenge>>>,
}

impl MockChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeRepository for MockChallengeRepository {
    async fn create(&self, challenge: OtpChallenge) -> Result<(), DomainError> {
        let mut challenges = self.challenges.write().await;
        if challenges.contains_key(&challenge.id) {
            return Err(DomainError::Validation {
                message: "Challenge id already exists".to_string(),
            });
        }
        challenges.insert(challenge.id, challenge);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(&id).cloned())
    }

    async fn find_active_by_identifier(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<OtpChallenge>, DomainError> {
        let challenges = self.challenges.read().await;
        Ok(challenges
            .values()
            .filter(|c| {
                c.identifier_hash == identifier_hash
                    && c.status == ChallengeStatus::Pending
                    && !c.is_expired()
            })
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn verify_and_consume(&self, id: Uuid, code_hash: &str) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        let Some(challenge) = challenges.get_mut(&id) else {
            return Ok(false);
        };
        let consumable = challenge.status == ChallengeStatus::Pending
            && Utc::now() < challenge.expires_at
            && constant_time_eq(challenge.code_hash.as_bytes(), code_hash.as_bytes());
        if !consumable {
            return Ok(false);
        }
        challenge.status = ChallengeStatus::Verified;
        Ok(true)
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<u32, DomainError> {
        let mut challenges = self.challenges.write().await;
        let challenge = challenges.get_mut(&id).ok_or(DomainError::NotFound {
            resource: "Challenge".to_string(),
        })?;
        challenge.attempts += 1;
        Ok(challenge.attempts)
    }

    async fn mark_failed(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        Ok(challenges
            .get_mut(&id)
            .map(|c| c.mark_failed())
            .unwrap_or(false))
    }

    async fn mark_expired(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        Ok(challenges
            .get_mut(&id)
            .map(|c| c.mark_expired())
            .unwrap_or(false))
    }

    async fn apply_resend(&self, id: Uuid, new_code_hash: &str) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        let Some(challenge) = challenges.get_mut(&id) else {
            return Ok(false);
        };
        if !challenge.can_resend() {
            return Ok(false);
        }
        challenge.code_hash = new_code_hash.to_string();
        challenge.resend_count += 1;
        challenge.attempts = 0;
        Ok(true)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        Ok(challenges.remove(&id).is_some())
    }
}
