//! Denylist and bounce escalation behavior

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::suppression::{BlockReason, BounceClass};
use crate::repositories::{MockBounceRepository, MockDenylistRepository};
use crate::services::suppression::{SuppressionConfig, SuppressionService};

const HASH: &str = "identifier-hash-a";

fn service() -> SuppressionService<MockDenylistRepository, MockBounceRepository> {
    SuppressionService::new(
        Arc::new(MockDenylistRepository::new()),
        Arc::new(MockBounceRepository::new()),
        SuppressionConfig::default(),
    )
}

#[tokio::test]
async fn test_unknown_identifier_is_not_blocked() {
    let service = service();
    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);
}

#[tokio::test]
async fn test_manual_block_and_unblock() {
    let service = service();
    let reason = BlockReason::Manual {
        note: "support ticket 4821".to_string(),
    };

    service.block(HASH, reason.clone(), None).await.unwrap();
    assert_eq!(service.is_blocked(HASH).await.unwrap(), Some(reason));

    assert!(service.unblock(HASH).await.unwrap());
    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);
    assert!(!service.unblock(HASH).await.unwrap());
}

#[tokio::test]
async fn test_expired_entry_is_evicted_on_read() {
    let service = service();
    service
        .block(
            HASH,
            BlockReason::AbuseDetected,
            Some(Utc::now() - Duration::minutes(1)),
        )
        .await
        .unwrap();

    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);
    // The lapsed entry is gone, not merely masked
    assert!(!service.unblock(HASH).await.unwrap());
}

#[tokio::test]
async fn test_unexpired_temporary_entry_blocks() {
    let service = service();
    service
        .block(
            HASH,
            BlockReason::AbuseDetected,
            Some(Utc::now() + Duration::hours(1)),
        )
        .await
        .unwrap();

    assert_eq!(
        service.is_blocked(HASH).await.unwrap(),
        Some(BlockReason::AbuseDetected)
    );
}

#[tokio::test]
async fn test_second_permanent_bounce_escalates() {
    let service = service();

    let escalated = service
        .record_bounce(HASH, BounceClass::Permanent, "msg-1")
        .await
        .unwrap();
    assert!(!escalated);
    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);

    let escalated = service
        .record_bounce(HASH, BounceClass::Permanent, "msg-2")
        .await
        .unwrap();
    assert!(escalated);
    assert_eq!(
        service.is_blocked(HASH).await.unwrap(),
        Some(BlockReason::HardBounce)
    );
}

#[tokio::test]
async fn test_redelivered_bounce_does_not_double_count() {
    let service = service();

    service
        .record_bounce(HASH, BounceClass::Permanent, "msg-1")
        .await
        .unwrap();
    // Same upstream notification delivered again
    let escalated = service
        .record_bounce(HASH, BounceClass::Permanent, "msg-1")
        .await
        .unwrap();

    assert!(!escalated);
    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);
}

#[tokio::test]
async fn test_transient_bounces_never_escalate() {
    let service = service();

    for n in 0..10 {
        let escalated = service
            .record_bounce(HASH, BounceClass::Transient, &format!("msg-{}", n))
            .await
            .unwrap();
        assert!(!escalated);
    }
    assert_eq!(service.is_blocked(HASH).await.unwrap(), None);
}

#[tokio::test]
async fn test_first_complaint_blocks_permanently() {
    let service = service();

    service.record_complaint(HASH, "msg-1").await.unwrap();
    assert_eq!(
        service.is_blocked(HASH).await.unwrap(),
        Some(BlockReason::Complaint)
    );
}

#[tokio::test]
async fn test_escalation_is_scoped_to_the_identifier() {
    let service = service();

    service
        .record_bounce(HASH, BounceClass::Permanent, "msg-1")
        .await
        .unwrap();
    service
        .record_bounce(HASH, BounceClass::Permanent, "msg-2")
        .await
        .unwrap();

    assert_eq!(service.is_blocked("identifier-hash-b").await.unwrap(), None);
}
