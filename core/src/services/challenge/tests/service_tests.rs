//! Challenge lifecycle behavior against the in-memory repository

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::challenge::{AuthIntent, Channel, ChallengeStatus};
use crate::errors::{AuthError, DomainError};
use crate::repositories::MockChallengeRepository;
use crate::services::challenge::{ChallengeService, ChallengeServiceConfig};

const HASH: &str = "identifier-hash-a";

fn service() -> ChallengeService<MockChallengeRepository> {
    ChallengeService::new(
        Arc::new(MockChallengeRepository::new()),
        ChallengeServiceConfig::default(),
    )
}

fn assert_auth_error(result: Result<impl std::fmt::Debug, DomainError>, expected: AuthError) {
    match result {
        Err(DomainError::Auth(err)) => assert_eq!(err, expected),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_issue_produces_pending_challenge_with_hashed_code() {
    let service = service();

    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();

    assert_eq!(issued.plaintext_code.len(), 6);
    assert!(issued.plaintext_code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(issued.challenge.status, ChallengeStatus::Pending);
    assert_ne!(issued.challenge.code_hash, issued.plaintext_code);
}

#[tokio::test]
async fn test_correct_code_verifies_and_consumes() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();

    let verified = service
        .verify(issued.challenge.id, &issued.plaintext_code)
        .await
        .unwrap();
    assert_eq!(verified.status, ChallengeStatus::Verified);
}

#[tokio::test]
async fn test_consumed_challenge_reports_not_found() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    service
        .verify(issued.challenge.id, &issued.plaintext_code)
        .await
        .unwrap();

    // A second submission must not reveal that the challenge once
    // existed and was used.
    assert_auth_error(
        service.verify(issued.challenge.id, &issued.plaintext_code).await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_wrong_code_counts_down_then_exhausts() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    let id = issued.challenge.id;

    assert_auth_error(
        service.verify(id, "000000").await,
        AuthError::InvalidCode {
            remaining_attempts: Some(2),
        },
    );
    assert_auth_error(
        service.verify(id, "000000").await,
        AuthError::InvalidCode {
            remaining_attempts: Some(1),
        },
    );
    assert_auth_error(service.verify(id, "000000").await, AuthError::AttemptsExhausted);

    // Even the correct code is dead once the challenge has failed
    assert_auth_error(
        service.verify(id, &issued.plaintext_code).await,
        AuthError::AttemptsExhausted,
    );
}

#[tokio::test]
async fn test_expired_challenge_is_rejected_lazily() {
    let service = service();
    let challenge = service
        .issue_with_code(HASH, Channel::Email, AuthIntent::SignIn, "482910", -5)
        .await
        .unwrap();

    assert_auth_error(
        service.verify(challenge.id, "482910").await,
        AuthError::ChallengeExpired,
    );
}

#[tokio::test]
async fn test_unknown_challenge_reports_not_found() {
    let service = service();
    assert_auth_error(
        service.verify(Uuid::new_v4(), "123456").await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_resend_rotates_the_code_and_resets_attempts() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    let id = issued.challenge.id;

    // Burn an attempt against the first code
    let _ = service.verify(id, "000000").await;

    let reissued = service.resend(id).await.unwrap();
    assert_ne!(reissued.plaintext_code, issued.plaintext_code);
    assert_eq!(reissued.challenge.resend_count, 1);
    assert_eq!(reissued.challenge.attempts, 0);

    let verified = service.verify(id, &reissued.plaintext_code).await.unwrap();
    assert_eq!(verified.status, ChallengeStatus::Verified);
}

#[tokio::test]
async fn test_old_code_stops_working_after_resend() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    let id = issued.challenge.id;

    let reissued = service.resend(id).await.unwrap();
    // Codes are 6 digits so a collision is possible but vanishingly rare;
    // guard the assertion rather than flake.
    if reissued.plaintext_code != issued.plaintext_code {
        assert_auth_error(
            service.verify(id, &issued.plaintext_code).await,
            AuthError::InvalidCode {
                remaining_attempts: Some(2),
            },
        );
    }
}

#[tokio::test]
async fn test_resend_cap_is_enforced() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    let id = issued.challenge.id;

    service.resend(id).await.unwrap();
    service.resend(id).await.unwrap();
    assert_auth_error(service.resend(id).await, AuthError::ResendLimitExceeded);
}

#[tokio::test]
async fn test_verify_by_identifier_targets_the_active_challenge() {
    let service = service();
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();

    let verified = service
        .verify_by_identifier(HASH, &issued.plaintext_code)
        .await
        .unwrap();
    assert_eq!(verified.id, issued.challenge.id);

    assert_auth_error(
        service.verify_by_identifier("unknown-hash", "123456").await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_correct_submissions_succeed_exactly_once() {
    let service = Arc::new(service());
    let issued = service
        .issue(HASH, Channel::Sms, AuthIntent::SignIn)
        .await
        .unwrap();
    let id = issued.challenge.id;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let code = issued.plaintext_code.clone();
        handles.push(tokio::spawn(async move { service.verify(id, &code).await }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}
