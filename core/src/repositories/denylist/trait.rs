//! Denylist repository trait for suppression entries.

use async_trait::async_trait;

use crate::domain::entities::suppression::DenylistEntry;
use crate::errors::DomainError;

/// Repository contract for the suppression denylist
///
/// Expiry interpretation (an entry past `expires_at` does not block) lives
/// in the suppression service; the store only holds rows.
#[async_trait]
pub trait DenylistRepository: Send + Sync {
    /// Insert or replace the entry for an identifier hash
    async fn add(&self, entry: DenylistEntry) -> Result<(), DomainError>;

    /// Remove an entry; removing an absent entry is a no-op
    async fn remove(&self, identifier_hash: &str) -> Result<bool, DomainError>;

    async fn find(&self, identifier_hash: &str) -> Result<Option<DenylistEntry>, DomainError>;
}
