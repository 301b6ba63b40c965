//! In-memory implementation of DenylistRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::suppression::DenylistEntry;
use crate::errors::DomainError;

use super::trait_::DenylistRepository;

/// Mock denylist repository backed by a `HashMap`
#[derive(Default)]
pub struct MockDenylistRepository {
    entries: Arc<RwLock<HashMap<String, DenylistEntry>>>,
}

impl MockDenylistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DenylistRepository for MockDenylistRepository {
    async fn add(&self, entry: DenylistEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.identifier_hash.clone(), entry);
        Ok(())
    }

    async fn remove(&self, identifier_hash: &str) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(identifier_hash).is_some())
    }

    async fn find(&self, identifier_hash: &str) -> Result<Option<DenylistEntry>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries.get(identifier_hash).cloned())
    }
}
