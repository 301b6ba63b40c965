//! Denylist checks and bounce/complaint escalation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::entities::suppression::{
    BlockReason, BounceClass, BounceRecord, ComplaintRecord, DenylistEntry,
};
use crate::errors::DomainResult;
use crate::repositories::{BounceRepository, DenylistRepository};

/// Configuration for suppression escalation
#[derive(Debug, Clone)]
pub struct SuppressionConfig {
    /// Permanent bounces before the identifier is denylisted for good
    pub permanent_bounce_threshold: u32,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            permanent_bounce_threshold: 2,
        }
    }
}

/// Service managing the denylist and delivery feedback escalation
pub struct SuppressionService<D: DenylistRepository, B: BounceRepository> {
    denylist: Arc<D>,
    bounces: Arc<B>,
    config: SuppressionConfig,
}

impl<D: DenylistRepository, B: BounceRepository> SuppressionService<D, B> {
    pub fn new(denylist: Arc<D>, bounces: Arc<B>, config: SuppressionConfig) -> Self {
        Self {
            denylist,
            bounces,
            config,
        }
    }

    /// Whether an identifier is currently suppressed, and why
    ///
    /// An entry past its expiry does not block and is removed on this
    /// read, so expiry needs no sweep job.
    pub async fn is_blocked(&self, identifier_hash: &str) -> DomainResult<Option<BlockReason>> {
        let Some(entry) = self.denylist.find(identifier_hash).await? else {
            return Ok(None);
        };
        if entry.is_expired() {
            self.denylist.remove(identifier_hash).await?;
            return Ok(None);
        }
        Ok(Some(entry.reason))
    }

    /// Add an identifier to the denylist
    pub async fn block(
        &self,
        identifier_hash: &str,
        reason: BlockReason,
        expires_at: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let entry = match expires_at {
            Some(expires_at) => {
                DenylistEntry::temporary(identifier_hash.to_string(), reason.clone(), expires_at)
            }
            None => DenylistEntry::permanent(identifier_hash.to_string(), reason.clone()),
        };
        self.denylist.add(entry).await?;
        info!(
            reason = reason.as_str(),
            permanent = expires_at.is_none(),
            event = "identifier_blocked",
            "Identifier added to denylist"
        );
        Ok(())
    }

    /// Remove an identifier from the denylist; `false` if it was absent
    pub async fn unblock(&self, identifier_hash: &str) -> DomainResult<bool> {
        self.denylist.remove(identifier_hash).await
    }

    /// Record a delivery bounce, escalating to a permanent block when the
    /// permanent-bounce count reaches the threshold
    ///
    /// Returns `true` when this call escalated. Transient bounces are
    /// recorded for diagnostics but never escalate. Safe under redelivery:
    /// the store deduplicates by message id and re-adding a denylist entry
    /// replaces it.
    pub async fn record_bounce(
        &self,
        identifier_hash: &str,
        classification: BounceClass,
        message_id: &str,
    ) -> DomainResult<bool> {
        self.bounces
            .record_bounce(BounceRecord::new(
                identifier_hash.to_string(),
                classification,
                message_id.to_string(),
            ))
            .await?;

        if classification != BounceClass::Permanent {
            return Ok(false);
        }

        let permanent_bounces = self
            .bounces
            .bounce_count(identifier_hash, BounceClass::Permanent)
            .await?;
        if permanent_bounces < self.config.permanent_bounce_threshold {
            return Ok(false);
        }

        self.denylist
            .add(DenylistEntry::permanent(
                identifier_hash.to_string(),
                BlockReason::HardBounce,
            ))
            .await?;
        warn!(
            permanent_bounces = permanent_bounces,
            event = "bounce_escalated",
            "Identifier permanently blocked after repeated hard bounces"
        );
        Ok(true)
    }

    /// Record a spam complaint; the first one blocks permanently
    pub async fn record_complaint(
        &self,
        identifier_hash: &str,
        message_id: &str,
    ) -> DomainResult<()> {
        self.bounces
            .record_complaint(ComplaintRecord::new(
                identifier_hash.to_string(),
                message_id.to_string(),
            ))
            .await?;

        self.denylist
            .add(DenylistEntry::permanent(
                identifier_hash.to_string(),
                BlockReason::Complaint,
            ))
            .await?;
        warn!(
            event = "complaint_escalated",
            "Identifier permanently blocked after spam complaint"
        );
        Ok(())
    }
}
