//! Device binding, recognition, and trust management

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::entities::device::{
    Device, DeviceFingerprint, FingerprintComponents, DEFAULT_MAX_DAYS_INACTIVE,
};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::DeviceRepository;

/// Configuration for device trust decisions
#[derive(Debug, Clone)]
pub struct DeviceServiceConfig {
    /// Days of inactivity after which a trusted device no longer skips
    /// challenges
    pub max_days_inactive: i64,
    /// Whether a freshly bound device starts out trusted
    pub trust_on_bind: bool,
}

impl Default for DeviceServiceConfig {
    fn default() -> Self {
        Self {
            max_days_inactive: DEFAULT_MAX_DAYS_INACTIVE,
            trust_on_bind: true,
        }
    }
}

/// Service for user-device bindings
pub struct DeviceService<D: DeviceRepository> {
    repository: Arc<D>,
    config: DeviceServiceConfig,
}

impl<D: DeviceRepository> DeviceService<D> {
    pub fn new(repository: Arc<D>, config: DeviceServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Bind the reported client signals to a user as a device
    ///
    /// A device already known by exact fingerprint is refreshed in place
    /// rather than duplicated.
    pub async fn bind(
        &self,
        user_id: Uuid,
        components: FingerprintComponents,
    ) -> DomainResult<Device> {
        let fingerprint = DeviceFingerprint::new(components);

        if let Some(mut existing) = self
            .repository
            .find_by_fingerprint(user_id, &fingerprint.hash)
            .await?
        {
            existing.mark_as_seen();
            return self.repository.upsert(existing).await;
        }

        let device = Device::new(user_id, fingerprint, self.config.trust_on_bind);
        let device = self.repository.upsert(device).await?;

        info!(
            user_id = %user_id,
            device_id = %device.id,
            trusted = device.trusted,
            event = "device_bound",
            "Device bound to user"
        );

        Ok(device)
    }

    /// Recognize the reporting device among the user's known devices
    ///
    /// Tries an exact fingerprint hash first, then falls back to fuzzy
    /// matching on the core component triple so minor client drift does
    /// not orphan the binding.
    pub async fn recognize(
        &self,
        user_id: Uuid,
        components: FingerprintComponents,
    ) -> DomainResult<Option<Device>> {
        let fingerprint = DeviceFingerprint::new(components);

        if let Some(device) = self
            .repository
            .find_by_fingerprint(user_id, &fingerprint.hash)
            .await?
        {
            return Ok(Some(device));
        }

        let devices = self.repository.list_by_user(user_id).await?;
        Ok(devices
            .into_iter()
            .find(|device| device.fingerprint.matches(&fingerprint, false)))
    }

    /// Whether this device may skip the challenge entirely
    ///
    /// Requires a recognized binding that is trusted, unrevoked, and has
    /// been active recently enough.
    pub async fn can_skip_challenge(
        &self,
        user_id: Uuid,
        components: FingerprintComponents,
    ) -> DomainResult<bool> {
        let Some(device) = self.recognize(user_id, components).await? else {
            return Ok(false);
        };
        Ok(device.is_effectively_trusted() && !device.is_stale(self.config.max_days_inactive))
    }

    /// Mark a device as trusted
    pub async fn trust(&self, user_id: Uuid, device_id: Uuid) -> DomainResult<()> {
        if !self.repository.trust(user_id, device_id).await? {
            return Err(DomainError::NotFound {
                resource: "Device".to_string(),
            });
        }
        info!(
            user_id = %user_id,
            device_id = %device_id,
            event = "device_trusted",
            "Device trusted"
        );
        Ok(())
    }

    /// Revoke a device's trust
    pub async fn revoke(&self, user_id: Uuid, device_id: Uuid) -> DomainResult<()> {
        if !self.repository.revoke(user_id, device_id).await? {
            return Err(DomainError::NotFound {
                resource: "Device".to_string(),
            });
        }
        info!(
            user_id = %user_id,
            device_id = %device_id,
            event = "device_revoked",
            "Device trust revoked"
        );
        Ok(())
    }

    /// Record activity on a known device
    pub async fn mark_seen(&self, user_id: Uuid, device_id: Uuid) -> DomainResult<()> {
        let Some(mut device) = self
            .repository
            .find_by_user_and_device(user_id, device_id)
            .await?
        else {
            return Err(DomainError::NotFound {
                resource: "Device".to_string(),
            });
        };
        device.mark_as_seen();
        self.repository.upsert(device).await?;
        Ok(())
    }

    /// All devices bound to a user
    pub async fn list(&self, user_id: Uuid) -> DomainResult<Vec<Device>> {
        self.repository.list_by_user(user_id).await
    }
}
