//! End-to-end authentication flow behavior over in-memory stores

use std::collections::HashSet;
use std::sync::Arc;

use shared::config::abuse::{AbusePolicyConfig, ActionThresholds};
use shared::config::rate_limit::RateLimitConfig;

use crate::domain::entities::challenge::{AuthIntent, Channel};
use crate::domain::entities::identifier::Identifier;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{
    MockBounceRepository, MockChallengeRepository, MockCounterStore, MockDenylistRepository,
    MockRedeemedTokenRepository,
};
use crate::services::abuse::AbuseDetector;
use crate::services::auth::{AuthAttempt, AuthService};
use crate::services::challenge::{ChallengeService, ChallengeServiceConfig};
use crate::services::magic_link::{MagicLinkConfig, MagicLinkService};
use crate::services::rate_limit::RateLimiter;
use crate::services::suppression::{SuppressionConfig, SuppressionService};

use super::mocks::MockDeliveryProvider;

const EMAIL: &str = "user@example.com";
const PHONE: &str = "+33612345678";
const BROWSER_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Safari/605.1.15";

type TestAuthService = AuthService<
    MockChallengeRepository,
    MockCounterStore,
    MockDenylistRepository,
    MockBounceRepository,
    MockRedeemedTokenRepository,
    MockDeliveryProvider,
>;

struct Fixture {
    service: TestAuthService,
    delivery: Arc<MockDeliveryProvider>,
    suppression: Arc<SuppressionService<MockDenylistRepository, MockBounceRepository>>,
}

fn fixture() -> Fixture {
    fixture_with(AbusePolicyConfig::default())
}

fn fixture_with(abuse_config: AbusePolicyConfig) -> Fixture {
    let counters = Arc::new(MockCounterStore::new());
    let delivery = Arc::new(MockDeliveryProvider::new());
    let suppression = Arc::new(SuppressionService::new(
        Arc::new(MockDenylistRepository::new()),
        Arc::new(MockBounceRepository::new()),
        SuppressionConfig::default(),
    ));
    let service = AuthService::new(
        Arc::new(ChallengeService::new(
            Arc::new(MockChallengeRepository::new()),
            ChallengeServiceConfig::default(),
        )),
        Arc::new(RateLimiter::new(counters.clone(), RateLimitConfig::default())),
        Arc::new(AbuseDetector::new(
            counters,
            abuse_config,
            Arc::new(HashSet::new()),
        )),
        suppression.clone(),
        Arc::new(MagicLinkService::new(
            Arc::new(MockRedeemedTokenRepository::new()),
            MagicLinkConfig::default(),
        )),
        delivery.clone(),
    );
    Fixture {
        service,
        delivery,
        suppression,
    }
}

fn attempt(identifier: &str, channel: Channel) -> AuthAttempt {
    AuthAttempt {
        identifier: identifier.to_string(),
        channel,
        intent: AuthIntent::SignIn,
        ip: "203.0.113.7".to_string(),
        country: None,
        user_agent: Some(BROWSER_UA.to_string()),
    }
}

fn assert_auth_error(result: Result<impl std::fmt::Debug, DomainError>, expected: AuthError) {
    match result {
        Err(DomainError::Auth(err)) => assert_eq!(err, expected),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_challenge_round_trip() {
    let fixture = fixture();

    let started = fixture
        .service
        .begin_challenge(&attempt(PHONE, Channel::Sms))
        .await
        .unwrap();
    assert!(!started.resent);
    assert!(!started.captcha_required);
    assert_eq!(started.masked_identifier, "***5678");

    let code = fixture.delivery.last_body().await.unwrap();
    let verified = fixture.service.verify_code(PHONE, &code).await.unwrap();
    assert_eq!(verified.challenge_id, started.challenge_id);
    assert_eq!(verified.intent, AuthIntent::SignIn);
}

#[tokio::test]
async fn test_second_begin_resends_the_active_challenge() {
    let fixture = fixture();
    let attempt = attempt(PHONE, Channel::Sms);

    let first = fixture.service.begin_challenge(&attempt).await.unwrap();
    let second = fixture.service.begin_challenge(&attempt).await.unwrap();

    assert!(second.resent);
    assert_eq!(second.challenge_id, first.challenge_id);
    assert_eq!(fixture.delivery.sent_count().await, 2);

    // Only the latest code verifies
    let code = fixture.delivery.last_body().await.unwrap();
    assert!(fixture.service.verify_code(PHONE, &code).await.is_ok());
}

#[tokio::test]
async fn test_wrong_code_reports_remaining_attempts() {
    let fixture = fixture();
    fixture
        .service
        .begin_challenge(&attempt(PHONE, Channel::Sms))
        .await
        .unwrap();

    assert_auth_error(
        fixture.service.verify_code(PHONE, "000000").await,
        AuthError::InvalidCode {
            remaining_attempts: Some(2),
        },
    );
}

#[tokio::test]
async fn test_verify_without_active_challenge_reports_not_found() {
    let fixture = fixture();
    assert_auth_error(
        fixture.service.verify_code(PHONE, "123456").await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_malformed_identifier_is_rejected_up_front() {
    let fixture = fixture();
    assert_auth_error(
        fixture
            .service
            .begin_challenge(&attempt("not an identifier", Channel::Sms))
            .await,
        AuthError::InvalidIdentifier,
    );
    assert_eq!(fixture.delivery.sent_count().await, 0);
}

#[tokio::test]
async fn test_identifier_rate_limit_applies_across_begins() {
    let fixture = fixture();
    let attempt = attempt(PHONE, Channel::Sms);

    // Default identifier limit is 5 per window; consume each challenge so
    // the next begin issues instead of resending into the resend cap.
    for _ in 0..5 {
        fixture.service.begin_challenge(&attempt).await.unwrap();
        let code = fixture.delivery.last_body().await.unwrap();
        fixture.service.verify_code(PHONE, &code).await.unwrap();
    }

    match fixture.service.begin_challenge(&attempt).await {
        Err(DomainError::Auth(AuthError::RateLimited { .. })) => {}
        other => panic!("expected rate limit, got {:?}", other),
    }
    assert_eq!(fixture.delivery.sent_count().await, 5);
}

#[tokio::test]
async fn test_suppressed_identifier_cannot_begin_or_verify() {
    let fixture = fixture();
    let hash = Identifier::new(EMAIL).unwrap().hash().to_string();
    fixture
        .suppression
        .record_complaint(&hash, "msg-upstream-1")
        .await
        .unwrap();

    assert_auth_error(
        fixture
            .service
            .begin_challenge(&attempt(EMAIL, Channel::Email))
            .await,
        AuthError::Blocked {
            reason: "complaint".to_string(),
        },
    );
    assert_auth_error(
        fixture.service.verify_code(EMAIL, "123456").await,
        AuthError::Blocked {
            reason: "complaint".to_string(),
        },
    );
    assert_eq!(fixture.delivery.sent_count().await, 0);
}

#[tokio::test]
async fn test_high_risk_attempt_is_blocked_before_delivery() {
    // Tight thresholds so a single bot-UA signal blocks
    let fixture = fixture_with(AbusePolicyConfig {
        thresholds: ActionThresholds {
            block: 0.1,
            challenge: 0.05,
        },
        ..AbusePolicyConfig::default()
    });

    let mut attempt = attempt(PHONE, Channel::Sms);
    attempt.user_agent = Some("curl/8.4".to_string());

    assert_auth_error(
        fixture.service.begin_challenge(&attempt).await,
        AuthError::Blocked {
            reason: "abuse_detected".to_string(),
        },
    );
    assert_eq!(fixture.delivery.sent_count().await, 0);
}

#[tokio::test]
async fn test_medium_risk_attempt_requires_captcha_but_proceeds() {
    let fixture = fixture_with(AbusePolicyConfig {
        thresholds: ActionThresholds {
            block: 0.9,
            challenge: 0.05,
        },
        ..AbusePolicyConfig::default()
    });

    let mut attempt = attempt(PHONE, Channel::Sms);
    attempt.user_agent = Some("curl/8.4".to_string());

    let started = fixture.service.begin_challenge(&attempt).await.unwrap();
    assert!(started.captcha_required);
    assert_eq!(fixture.delivery.sent_count().await, 1);
}

#[tokio::test]
async fn test_delivery_failure_surfaces_without_consuming_the_flow() {
    let fixture = fixture();
    fixture.delivery.set_failing(true);

    assert_auth_error(
        fixture
            .service
            .begin_challenge(&attempt(PHONE, Channel::Sms))
            .await,
        AuthError::DeliveryFailure,
    );

    // Provider recovers; the same identifier can start a challenge
    fixture.delivery.set_failing(false);
    assert!(fixture
        .service
        .begin_challenge(&attempt(PHONE, Channel::Sms))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_magic_link_round_trip() {
    let fixture = fixture();

    let started = fixture
        .service
        .begin_magic_link(&attempt(EMAIL, Channel::Email))
        .await
        .unwrap();

    let link = fixture.delivery.last_body().await.unwrap();
    assert!(link.contains("token="));

    let verified = fixture.service.verify_magic_link(&link).await.unwrap();
    assert_eq!(verified.challenge_id, started.challenge_id);
    assert_eq!(
        verified.identifier_hash,
        Identifier::new(EMAIL).unwrap().hash()
    );
}

#[tokio::test]
async fn test_magic_link_is_single_use() {
    let fixture = fixture();
    fixture
        .service
        .begin_magic_link(&attempt(EMAIL, Channel::Email))
        .await
        .unwrap();
    let link = fixture.delivery.last_body().await.unwrap();

    fixture.service.verify_magic_link(&link).await.unwrap();
    match fixture.service.verify_magic_link(&link).await {
        Err(DomainError::Token(TokenError::TokenReplayed)) => {}
        other => panic!("expected replay rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_magic_link_requires_an_email_identifier() {
    let fixture = fixture();
    assert_auth_error(
        fixture
            .service
            .begin_magic_link(&attempt(PHONE, Channel::Email))
            .await,
        AuthError::InvalidIdentifier,
    );
}

#[tokio::test]
async fn test_tampered_magic_link_is_rejected() {
    let fixture = fixture();
    fixture
        .service
        .begin_magic_link(&attempt(EMAIL, Channel::Email))
        .await
        .unwrap();
    let link = fixture.delivery.last_body().await.unwrap();

    let mut tampered = link.clone();
    tampered.pop();
    tampered.push(if link.ends_with('A') { 'B' } else { 'A' });

    assert!(fixture.service.verify_magic_link(&tampered).await.is_err());
}

#[tokio::test]
async fn test_delivered_body_is_never_the_code_hash() {
    let fixture = fixture();
    let started = fixture
        .service
        .begin_challenge(&attempt(PHONE, Channel::Sms))
        .await
        .unwrap();

    let code = fixture.delivery.last_body().await.unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    // The provider got the plaintext, the store only ever saw the hash
    assert_ne!(code, format!("{}", started.challenge_id));
}
