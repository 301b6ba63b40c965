//! Configuration types for the authentication core
//!
//! Configuration is organized by policy area:
//! - `rate_limit` - Window rules for the sliding-window rate limiter
//! - `abuse` - Risk scoring weights, thresholds, and velocity windows

pub mod abuse;
pub mod rate_limit;

pub use abuse::{AbusePolicyConfig, ActionThresholds, SignalWeights, VelocityWindows};
pub use rate_limit::{RateLimitConfig, ScopeLimit};
