//! Redeemed-token repository trait for magic link single-use tracking.
//!
//! Signature verification alone cannot prevent replay: the redeemed-token
//! set must be durable and shared, because multiple stateless workers have
//! to agree on single-use status. Implementations should retain a redeemed
//! id until `expires_at` (a TTL equal to the token's maximum validity is
//! sufficient, since an expired token fails verification anyway).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DomainError;

/// Repository contract for the durable redeemed-token-id set
#[async_trait]
pub trait RedeemedTokenRepository: Send + Sync {
    /// Atomically record `token_id` as redeemed
    ///
    /// Returns `true` when this call was the first redemption, `false` when
    /// the id was already present. Must be a single insert-if-absent
    /// operation (`SET NX`, a unique-key insert), never a read-then-write.
    async fn redeem(
        &self,
        token_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    async fn is_redeemed(&self, token_id: Uuid) -> Result<bool, DomainError>;
}
