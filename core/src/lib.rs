//! # Keyless Core
//!
//! Domain and policy layer for passwordless authentication. This crate
//! contains the challenge lifecycle state machine, magic link tokens, the
//! sliding-window rate limiter, the abuse risk scorer, device trust, and
//! suppression (denylist / bounce escalation), together with the repository
//! interfaces the durable store must implement.
//!
//! The crate is stateless: every piece of state that must be consistent
//! across concurrent instances lives behind the repository traits, and the
//! two race-sensitive operations (code consumption, counter increment) are
//! expressed as single conditional calls into that store.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
