//! Shared configuration and common types for the Keyless authentication core
//!
//! This crate provides the operator-tunable policy configuration consumed by
//! the core services:
//! - Rate limit window rules per scope
//! - Abuse scoring weights and action thresholds
//! - The common error response envelope

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{AbusePolicyConfig, ActionThresholds, RateLimitConfig, ScopeLimit, SignalWeights};
pub use types::response::ErrorResponse;
