//! In-memory implementation of BounceRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::suppression::{BounceClass, BounceRecord, ComplaintRecord};
use crate::errors::DomainError;

use super::trait_::BounceRepository;

/// Mock bounce repository; rows are keyed (identifier_hash, message_id) so
/// re-recording a redelivered notification is idempotent
#[derive(Default)]
pub struct MockBounceRepository {
    bounces: Arc<RwLock<HashMap<(String, String), BounceRecord>>>,
    complaints: Arc<RwLock<HashMap<(String, String), ComplaintRecord>>>,
}

impl MockBounceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BounceRepository for MockBounceRepository {
    async fn record_bounce(&self, record: BounceRecord) -> Result<(), DomainError> {
        let mut bounces = self.bounces.write().await;
        let key = (record.identifier_hash.clone(), record.message_id.clone());
        bounces.entry(key).or_insert(record);
        Ok(())
    }

    async fn record_complaint(&self, record: ComplaintRecord) -> Result<(), DomainError> {
        let mut complaints = self.complaints.write().await;
        let key = (record.identifier_hash.clone(), record.message_id.clone());
        complaints.entry(key).or_insert(record);
        Ok(())
    }

    async fn bounce_count(
        &self,
        identifier_hash: &str,
        classification: BounceClass,
    ) -> Result<u32, DomainError> {
        let bounces = self.bounces.read().await;
        Ok(bounces
            .values()
            .filter(|b| b.identifier_hash == identifier_hash && b.classification == classification)
            .count() as u32)
    }

    async fn complaint_count(&self, identifier_hash: &str) -> Result<u32, DomainError> {
        let complaints = self.complaints.read().await;
        Ok(complaints
            .values()
            .filter(|c| c.identifier_hash == identifier_hash)
            .count() as u32)
    }

    async fn last_bounce(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<BounceRecord>, DomainError> {
        let bounces = self.bounces.read().await;
        Ok(bounces
            .values()
            .filter(|b| b.identifier_hash == identifier_hash)
            .max_by_key(|b| b.occurred_at)
            .cloned())
    }

    async fn last_complaint(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<ComplaintRecord>, DomainError> {
        let complaints = self.complaints.read().await;
        Ok(complaints
            .values()
            .filter(|c| c.identifier_hash == identifier_hash)
            .max_by_key(|c| c.occurred_at)
            .cloned())
    }
}
