//! Sliding-window rate limiter over the shared counter store.
//!
//! "Sliding" here means fixed windows: a counter resets entirely once its
//! window lapses rather than smoothly decaying. The limiter never combines
//! scopes; callers evaluate each scope they care about and deny if any
//! scope denies.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use shared::config::rate_limit::{RateLimitConfig, ScopeLimit};

use crate::errors::DomainResult;
use crate::repositories::CounterStore;

/// Independent counting scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// Per contact identifier hash
    Identifier,
    /// Per client IP hash
    Ip,
    /// All requests combined
    Global,
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Identifier => "identifier",
            RateLimitScope::Ip => "ip",
            RateLimitScope::Global => "global",
        }
    }
}

/// Outcome of one check-and-increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Attempts left in the current window after this increment
    pub remaining: u32,
    /// Fixed window expiry chosen at window creation, never recomputed
    pub resets_at: DateTime<Utc>,
}

/// Fixed-window rate limiter
///
/// All counting state lives in the injected [`CounterStore`]; the limiter
/// itself carries no mutable state and is safe to share across workers.
pub struct RateLimiter<C: CounterStore> {
    counters: Arc<C>,
    config: RateLimitConfig,
}

impl<C: CounterStore> RateLimiter<C> {
    pub fn new(counters: Arc<C>, config: RateLimitConfig) -> Self {
        Self { counters, config }
    }

    /// Count one request against a scope and decide whether it is allowed
    ///
    /// Delegates to the store's atomic window-initializing increment, so
    /// concurrent callers never lose an update. The decision compares the
    /// post-increment count against the scope's limit.
    pub async fn check_and_increment(
        &self,
        scope: RateLimitScope,
        key: &str,
    ) -> DomainResult<RateLimitDecision> {
        let rule = self.rule(scope);

        if !self.config.enabled {
            return Ok(RateLimitDecision {
                allowed: true,
                remaining: rule.max_attempts,
                resets_at: Utc::now(),
            });
        }

        let counter = self
            .counters
            .increment(&Self::counter_key(scope, key), rule.window_seconds)
            .await?;

        let allowed = counter.count <= rule.max_attempts;
        if !allowed {
            warn!(
                scope = scope.as_str(),
                count = counter.count,
                limit = rule.max_attempts,
                event = "rate_limit_exceeded",
                "Rate limit exceeded"
            );
        }

        Ok(RateLimitDecision {
            allowed,
            remaining: rule.max_attempts.saturating_sub(counter.count),
            resets_at: counter.expires_at,
        })
    }

    /// Delete a scope's counter early (manual unblock, test reset)
    ///
    /// Idempotent: resetting an absent counter is a no-op.
    pub async fn reset(&self, scope: RateLimitScope, key: &str) -> DomainResult<()> {
        self.counters.reset(&Self::counter_key(scope, key)).await
    }

    fn rule(&self, scope: RateLimitScope) -> ScopeLimit {
        match scope {
            RateLimitScope::Identifier => self.config.identifier,
            RateLimitScope::Ip => self.config.ip,
            RateLimitScope::Global => self.config.global,
        }
    }

    fn counter_key(scope: RateLimitScope, key: &str) -> String {
        format!("ratelimit:{}#{}", scope.as_str(), key)
    }
}
