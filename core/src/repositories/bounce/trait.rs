//! Bounce/complaint repository trait for delivery feedback records.

use async_trait::async_trait;

use crate::domain::entities::suppression::{BounceClass, BounceRecord, ComplaintRecord};
use crate::errors::DomainError;

/// Repository contract for append-only delivery feedback
///
/// Upstream notifications arrive at-least-once; implementations should key
/// rows by (identifier_hash, occurred_at, message_id) so storing a
/// redelivered event is idempotent rather than double-counted.
#[async_trait]
pub trait BounceRepository: Send + Sync {
    async fn record_bounce(&self, record: BounceRecord) -> Result<(), DomainError>;

    async fn record_complaint(&self, record: ComplaintRecord) -> Result<(), DomainError>;

    /// Number of stored bounces of the given class for an identifier
    async fn bounce_count(
        &self,
        identifier_hash: &str,
        classification: BounceClass,
    ) -> Result<u32, DomainError>;

    async fn complaint_count(&self, identifier_hash: &str) -> Result<u32, DomainError>;

    /// Most recent bounce for an identifier, if any
    async fn last_bounce(&self, identifier_hash: &str)
        -> Result<Option<BounceRecord>, DomainError>;

    /// Most recent complaint for an identifier, if any
    async fn last_complaint(
        &self,
        identifier_hash: &str,
    ) -> Result<Option<ComplaintRecord>, DomainError>;
}
