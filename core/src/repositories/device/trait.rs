//! Device repository trait for user-device bindings.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::device::Device;
use crate::errors::DomainError;

/// Repository contract for device trust persistence
///
/// One row per (user_id, device id); `upsert` replaces the existing binding.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn upsert(&self, device: Device) -> Result<Device, DomainError>;

    async fn find_by_user_and_device(
        &self,
        user_id: Uuid,
        device_id: Uuid,
    ) -> Result<Option<Device>, DomainError>;

    /// Look up a user's device by fingerprint hash (strict recognition)
    async fn find_by_fingerprint(
        &self,
        user_id: Uuid,
        fingerprint_hash: &str,
    ) -> Result<Option<Device>, DomainError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Device>, DomainError>;

    /// Set `trusted = true` and clear revocation; `false` if no such device
    async fn trust(&self, user_id: Uuid, device_id: Uuid) -> Result<bool, DomainError>;

    /// Set `trusted = false` and stamp `revoked_at`; `false` if no such device
    async fn revoke(&self, user_id: Uuid, device_id: Uuid) -> Result<bool, DomainError>;
}
