//! Test doubles shared by the auth service tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::challenge::Channel;
use crate::domain::entities::identifier::Identifier;
use crate::services::delivery::DeliveryProviderTrait;

/// A message the mock provider "delivered"
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel: Channel,
    pub recipient: String,
    /// Plaintext code or full link, as handed to the provider
    pub body: String,
}

/// Delivery provider that records messages instead of sending them
#[derive(Default)]
pub struct MockDeliveryProvider {
    pub sent: Arc<RwLock<Vec<SentMessage>>>,
    fail_next: AtomicBool,
}

impl MockDeliveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail until cleared
    pub fn set_failing(&self, failing: bool) {
        self.fail_next.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn last_body(&self) -> Option<String> {
        self.sent.read().await.last().map(|m| m.body.clone())
    }
}

#[async_trait]
impl DeliveryProviderTrait for MockDeliveryProvider {
    async fn send_code(
        &self,
        channel: Channel,
        identifier: &Identifier,
        code: &str,
    ) -> Result<String, String> {
        if self.fail_next.load(Ordering::SeqCst) {
            return Err("provider unavailable".to_string());
        }
        let mut sent = self.sent.write().await;
        sent.push(SentMessage {
            channel,
            recipient: identifier.value().to_string(),
            body: code.to_string(),
        });
        Ok(format!("msg-{}", sent.len()))
    }

    async fn send_link(
        &self,
        channel: Channel,
        identifier: &Identifier,
        link: &str,
    ) -> Result<String, String> {
        if self.fail_next.load(Ordering::SeqCst) {
            return Err("provider unavailable".to_string());
        }
        let mut sent = self.sent.write().await;
        sent.push(SentMessage {
            channel,
            recipient: identifier.value().to_string(),
            body: link.to_string(),
        });
        Ok(format!("msg-{}", sent.len()))
    }
}
