//! Counter store trait for fixed-window rate-limit counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A window counter snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCount {
    /// Post-increment count within the current window
    pub count: u32,
    /// Fixed expiry chosen when the window was created, never recomputed
    pub expires_at: DateTime<Utc>,
}

/// Contract for the shared counter store backing rate limiting and abuse
/// velocity signals
///
/// `increment` must be a single atomic request (Redis `INCR` + `EXPIRE NX`,
/// a conditional upsert, or equivalent) so concurrent increments from
/// multiple workers never lose an update. An increment observed after the
/// window's `expires_at` starts a fresh window with count 1; a stale count
/// is never returned.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter for `key`, initializing window
    /// metadata only when absent or lapsed
    async fn increment(&self, key: &str, window_seconds: u64) -> Result<WindowCount, DomainError>;

    /// Current counter, if a window exists (may be lapsed; callers check
    /// `expires_at`)
    async fn get(&self, key: &str) -> Result<Option<WindowCount>, DomainError>;

    /// Delete the counter early; resetting an absent key is a no-op
    async fn reset(&self, key: &str) -> Result<(), DomainError>;
}
