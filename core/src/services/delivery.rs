//! Delivery provider trait for out-of-band code and link delivery.
//!
//! Providers (SMS, email, WhatsApp adapters) live outside this crate. A
//! delivery failure never changes challenge state; only the asynchronous
//! bounce/complaint feedback path does, via the suppression service.

use async_trait::async_trait;

use crate::domain::entities::challenge::Channel;
use crate::domain::entities::identifier::Identifier;

/// Trait for message delivery integration
#[async_trait]
pub trait DeliveryProviderTrait: Send + Sync {
    /// Deliver a plaintext one-time code, returning the provider message id
    async fn send_code(
        &self,
        channel: Channel,
        identifier: &Identifier,
        code: &str,
    ) -> Result<String, String>;

    /// Deliver a magic link URL, returning the provider message id
    async fn send_link(
        &self,
        channel: Channel,
        identifier: &Identifier,
        link: &str,
    ) -> Result<String, String>;
}
