//! Suppression service
//!
//! Denylist lookups with lazy expiry plus bounce/complaint escalation.

mod service;

pub use service::{SuppressionConfig, SuppressionService};

#[cfg(test)]
mod tests;
