//! Sliding-window rate limiting over the shared counter store.

mod limiter;

pub use limiter::{RateLimitDecision, RateLimitScope, RateLimiter};
