//! Authentication flow orchestration
//!
//! Ties the policy pieces together for one inbound attempt: normalize the
//! identifier, consult the denylist, score the attempt, enforce every rate
//! limit scope, then create/resend/verify a challenge or magic link and
//! hand the secret to the delivery provider. Each gate logs its decision
//! with the masked identifier; raw contact values and plaintext codes
//! never reach the log stream.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::challenge::{AuthIntent, Channel};
use crate::domain::entities::identifier::{hash_value, Identifier, IdentifierKind};
use crate::errors::{AuthError, DomainResult};
use crate::repositories::{
    BounceRepository, ChallengeRepository, CounterStore, DenylistRepository,
    RedeemedTokenRepository,
};
use crate::services::abuse::{AbuseDetector, AssessmentContext, RiskAction};
use crate::services::challenge::{ChallengeService, IssuedChallenge};
use crate::services::delivery::DeliveryProviderTrait;
use crate::services::magic_link::MagicLinkService;
use crate::services::rate_limit::{RateLimiter, RateLimitScope};
use crate::services::suppression::SuppressionService;

/// Counter key shared by every request under the global scope
const GLOBAL_SCOPE_KEY: &str = "all";

/// One inbound authentication attempt as reported by the transport
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    /// Raw contact value as submitted
    pub identifier: String,
    pub channel: Channel,
    pub intent: AuthIntent,
    pub ip: String,
    /// ISO country code from upstream geo resolution, when available
    pub country: Option<String>,
    pub user_agent: Option<String>,
}

/// Outcome of starting an OTP challenge
#[derive(Debug, Clone)]
pub struct ChallengeStarted {
    pub challenge_id: Uuid,
    pub masked_identifier: String,
    /// Provider message id for the delivery
    pub message_id: String,
    /// Whether an existing challenge was resent rather than a new one issued
    pub resent: bool,
    /// Risk policy asked for a step-up before this challenge counts
    pub captcha_required: bool,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of starting a magic link flow
#[derive(Debug, Clone)]
pub struct MagicLinkStarted {
    pub challenge_id: Uuid,
    pub token_id: Uuid,
    pub masked_identifier: String,
    pub message_id: String,
    pub captcha_required: bool,
    pub expires_at: DateTime<Utc>,
}

/// A successfully verified attempt
#[derive(Debug, Clone)]
pub struct VerifiedAuth {
    pub challenge_id: Uuid,
    pub identifier_hash: String,
    pub intent: AuthIntent,
}

/// Authentication service orchestrating the full passwordless flow
pub struct AuthService<R, C, D, B, T, P>
where
    R: ChallengeRepository,
    C: CounterStore,
    D: DenylistRepository,
    B: BounceRepository,
    T: RedeemedTokenRepository,
    P: DeliveryProviderTrait,
{
    challenges: Arc<ChallengeService<R>>,
    rate_limiter: Arc<RateLimiter<C>>,
    abuse_detector: Arc<AbuseDetector<C>>,
    suppression: Arc<SuppressionService<D, B>>,
    magic_links: Arc<MagicLinkService<T>>,
    delivery: Arc<P>,
}

impl<R, C, D, B, T, P> AuthService<R, C, D, B, T, P>
where
    R: ChallengeRepository,
    C: CounterStore,
    D: DenylistRepository,
    B: BounceRepository,
    T: RedeemedTokenRepository,
    P: DeliveryProviderTrait,
{
    pub fn new(
        challenges: Arc<ChallengeService<R>>,
        rate_limiter: Arc<RateLimiter<C>>,
        abuse_detector: Arc<AbuseDetector<C>>,
        suppression: Arc<SuppressionService<D, B>>,
        magic_links: Arc<MagicLinkService<T>>,
        delivery: Arc<P>,
    ) -> Self {
        Self {
            challenges,
            rate_limiter,
            abuse_detector,
            suppression,
            magic_links,
            delivery,
        }
    }

    /// Start (or resend) an OTP challenge for an attempt
    ///
    /// Gates run in order: identifier normalization, denylist, risk
    /// scoring, then every rate limit scope. An existing active challenge
    /// is resent with a fresh code instead of stacking a second one.
    pub async fn begin_challenge(&self, attempt: &AuthAttempt) -> DomainResult<ChallengeStarted> {
        let identifier = Identifier::new(&attempt.identifier)?;
        let captcha_required = self.run_gates(&identifier, attempt).await?;

        let (issued, resent) = match self.challenges.find_active(identifier.hash()).await? {
            Some(active) => (self.challenges.resend(active.id).await?, true),
            None => (
                self.challenges
                    .issue(identifier.hash(), attempt.channel, attempt.intent)
                    .await?,
                false,
            ),
        };
        let IssuedChallenge {
            challenge,
            plaintext_code,
        } = issued;

        let message_id = self
            .delivery
            .send_code(attempt.channel, &identifier, &plaintext_code)
            .await
            .map_err(|provider_error| {
                warn!(
                    identifier = %identifier.masked(),
                    channel = attempt.channel.as_str(),
                    error = %provider_error,
                    event = "delivery_failed",
                    "Delivery provider failure"
                );
                AuthError::DeliveryFailure
            })?;

        info!(
            identifier = %identifier.masked(),
            challenge_id = %challenge.id,
            resent = resent,
            event = "challenge_started",
            "Challenge delivery dispatched"
        );

        Ok(ChallengeStarted {
            challenge_id: challenge.id,
            masked_identifier: identifier.masked(),
            message_id,
            resent,
            captcha_required,
            expires_at: challenge.expires_at,
        })
    }

    /// Verify a submitted code against the identifier's active challenge
    pub async fn verify_code(&self, raw_identifier: &str, code: &str) -> DomainResult<VerifiedAuth> {
        let identifier = Identifier::new(raw_identifier)?;

        if let Some(reason) = self.suppression.is_blocked(identifier.hash()).await? {
            return Err(AuthError::Blocked {
                reason: reason.as_str().to_string(),
            }
            .into());
        }

        let challenge = self
            .challenges
            .verify_by_identifier(identifier.hash(), code)
            .await?;

        info!(
            identifier = %identifier.masked(),
            challenge_id = %challenge.id,
            event = "code_verified",
            "Code verified"
        );

        Ok(VerifiedAuth {
            challenge_id: challenge.id,
            identifier_hash: challenge.identifier_hash,
            intent: challenge.intent,
        })
    }

    /// Start a magic link flow for an email attempt
    ///
    /// The link's token id doubles as the secret of a backing challenge
    /// whose validity follows the token's lifetime, so redeeming the link
    /// consumes the challenge through the same atomic path as a code.
    pub async fn begin_magic_link(&self, attempt: &AuthAttempt) -> DomainResult<MagicLinkStarted> {
        let identifier = Identifier::new(&attempt.identifier)?;
        if identifier.kind() != IdentifierKind::Email {
            return Err(AuthError::InvalidIdentifier.into());
        }
        let captcha_required = self.run_gates(&identifier, attempt).await?;

        let token_id = Uuid::new_v4();
        let challenge = self
            .challenges
            .issue_with_code(
                identifier.hash(),
                Channel::Email,
                attempt.intent,
                &token_id.to_string(),
                self.magic_links.validity_minutes(),
            )
            .await?;
        let token = self.magic_links.generate_with_token_id(
            &identifier,
            attempt.intent,
            challenge.id,
            token_id,
        )?;
        let link = self.magic_links.build_link(&token);

        let message_id = self
            .delivery
            .send_link(Channel::Email, &identifier, &link)
            .await
            .map_err(|provider_error| {
                warn!(
                    identifier = %identifier.masked(),
                    error = %provider_error,
                    event = "delivery_failed",
                    "Delivery provider failure"
                );
                AuthError::DeliveryFailure
            })?;

        info!(
            identifier = %identifier.masked(),
            challenge_id = %challenge.id,
            token_id = %token_id,
            event = "magic_link_started",
            "Magic link delivery dispatched"
        );

        Ok(MagicLinkStarted {
            challenge_id: challenge.id,
            token_id,
            masked_identifier: identifier.masked(),
            message_id,
            captcha_required,
            expires_at: challenge.expires_at,
        })
    }

    /// Redeem a magic link token
    ///
    /// Accepts either the bare token or the full link. Verification is
    /// stateless, then the denylist is consulted, then the token id is
    /// consumed exactly once, and finally the backing challenge is
    /// consumed through the same atomic path as a code submission.
    pub async fn verify_magic_link(&self, token_input: &str) -> DomainResult<VerifiedAuth> {
        let token = MagicLinkService::<T>::extract_token(token_input);
        let claims = self.magic_links.verify(token)?;

        if let Some(reason) = self.suppression.is_blocked(&claims.sub).await? {
            return Err(AuthError::Blocked {
                reason: reason.as_str().to_string(),
            }
            .into());
        }

        let claims = self.magic_links.verify_and_redeem(token).await?;
        let challenge = self
            .challenges
            .verify(claims.challenge_id, &claims.jti.to_string())
            .await?;

        info!(
            challenge_id = %challenge.id,
            token_id = %claims.jti,
            event = "magic_link_verified",
            "Magic link redeemed"
        );

        Ok(VerifiedAuth {
            challenge_id: challenge.id,
            identifier_hash: challenge.identifier_hash,
            intent: challenge.intent,
        })
    }

    /// Run the pre-issuance gates, returning whether a step-up is required
    async fn run_gates(
        &self,
        identifier: &Identifier,
        attempt: &AuthAttempt,
    ) -> DomainResult<bool> {
        if let Some(reason) = self.suppression.is_blocked(identifier.hash()).await? {
            warn!(
                identifier = %identifier.masked(),
                reason = reason.as_str(),
                event = "attempt_suppressed",
                "Attempt for suppressed identifier"
            );
            return Err(AuthError::Blocked {
                reason: reason.as_str().to_string(),
            }
            .into());
        }

        let assessment = self
            .abuse_detector
            .assess(&AssessmentContext {
                identifier_hash: identifier.hash().to_string(),
                email_domain: identifier.email_domain().map(str::to_string),
                ip: attempt.ip.clone(),
                country: attempt.country.clone(),
                user_agent: attempt.user_agent.clone(),
            })
            .await?;
        if assessment.action == RiskAction::Block {
            return Err(AuthError::Blocked {
                reason: "abuse_detected".to_string(),
            }
            .into());
        }

        // Every scope counts the attempt; deny if any scope denies
        let decisions = [
            self.rate_limiter
                .check_and_increment(RateLimitScope::Identifier, identifier.hash())
                .await?,
            self.rate_limiter
                .check_and_increment(RateLimitScope::Ip, &hash_value(&attempt.ip))
                .await?,
            self.rate_limiter
                .check_and_increment(RateLimitScope::Global, GLOBAL_SCOPE_KEY)
                .await?,
        ];
        if let Some(denied) = decisions.iter().find(|decision| !decision.allowed) {
            return Err(AuthError::RateLimited {
                resets_at: denied.resets_at,
            }
            .into());
        }

        Ok(assessment.action == RiskAction::Challenge)
    }
}
