//! In-memory implementation of CounterStore for testing

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::DomainError;

use super::trait_::{CounterStore, WindowCount};

/// Mock counter store backed by a `HashMap`
#[derive(Default)]
pub struct MockCounterStore {
    counters: Arc<RwLock<HashMap<String, WindowCount>>>,
}

impl MockCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a window to look lapsed, for window-rollover tests
    pub async fn age_window(&self, key: &str) {
        let mut counters = self.counters.write().await;
        if let Some(counter) = counters.get_mut(key) {
            counter.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

#[async_trait]
impl CounterStore for MockCounterStore {
    async fn increment(&self, key: &str, window_seconds: u64) -> Result<WindowCount, DomainError> {
        let mut counters = self.counters.write().await;
        let now = Utc::now();
        let entry = counters
            .entry(key.to_string())
            .and_modify(|counter| {
                if now >= counter.expires_at {
                    counter.count = 1;
                    counter.expires_at = now + Duration::seconds(window_seconds as i64);
                } else {
                    counter.count += 1;
                }
            })
            .or_insert_with(|| WindowCount {
                count: 1,
                expires_at: now + Duration::seconds(window_seconds as i64),
            });
        Ok(*entry)
    }

    async fn get(&self, key: &str) -> Result<Option<WindowCount>, DomainError> {
        let counters = self.counters.read().await;
        Ok(counters.get(key).copied())
    }

    async fn reset(&self, key: &str) -> Result<(), DomainError> {
        let mut counters = self.counters.write().await;
        counters.remove(key);
        Ok(())
    }
}
