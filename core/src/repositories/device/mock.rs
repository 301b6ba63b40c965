//! In-memory implementation of DeviceRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::device::Device;
use crate::errors::DomainError;

use super::trait_::DeviceRepository;

/// Mock device repository backed by a `HashMap` keyed (user_id, device_id)
#[derive(Default)]
pub struct MockDeviceRepository {
    devices: Arc<RwLock<HashMap<(Uuid, Uuid), Device>>>,
}

impl MockDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRepository for MockDeviceRepository {
    async fn upsert(&self, device: Device) -> Result<Device, DomainError> {
        let mut devices = self.devices.write().await;
        devices.insert((device.user_id, device.id), device.clone());
        Ok(device)
    }

    async fn find_by_user_and_device(
        &self,
        user_id: Uuid,
        device_id: Uuid,
    ) -> Result<Option<Device>, DomainError> {
        let devices = self.devices.read().await;
        Ok(devices.get(&(user_id, device_id)).cloned())
    }

    async fn find_by_fingerprint(
        &self,
        user_id: Uuid,
        fingerprint_hash: &str,
    ) -> Result<Option<Device>, DomainError> {
        let devices = self.devices.read().await;
        Ok(devices
            .values()
            .find(|d| d.user_id == user_id && d.fingerprint.hash == fingerprint_hash)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Device>, DomainError> {
        let devices = self.devices.read().await;
        Ok(devices
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn trust(&self, user_id: Uuid, device_id: Uuid) -> Result<bool, DomainError> {
        let mut devices = self.devices.write().await;
        match devices.get_mut(&(user_id, device_id)) {
            Some(device) => {
                device.trust();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke(&self, user_id: Uuid, device_id: Uuid) -> Result<bool, DomainError> {
        let mut devices = self.devices.write().await;
        match devices.get_mut(&(user_id, device_id)) {
            Some(device) => {
                device.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
