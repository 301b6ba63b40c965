//! In-memory implementation of RedeemedTokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::DomainError;

use super::trait_::RedeemedTokenRepository;

/// Mock redeemed-token set backed by a `HashMap`
#[derive(Default)]
pub struct MockRedeemedTokenRepository {
    redeemed: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl MockRedeemedTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RedeemedTokenRepository for MockRedeemedTokenRepository {
    async fn redeem(
        &self,
        token_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut redeemed = self.redeemed.write().await;
        if redeemed.contains_key(&token_id) {
            return Ok(false);
        }
        redeemed.insert(token_id, expires_at);
        Ok(true)
    }

    async fn is_redeemed(&self, token_id: Uuid) -> Result<bool, DomainError> {
        let redeemed = self.redeemed.read().await;
        Ok(redeemed.contains_key(&token_id))
    }
}
