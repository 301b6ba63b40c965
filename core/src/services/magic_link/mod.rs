//! Magic link token service
//!
//! Signed single-use login links: stateless HS256 verification plus a
//! durable redeemed-id set for exactly-once consumption.

mod config;
mod service;

pub use config::MagicLinkConfig;
pub use service::{MagicLinkClaims, MagicLinkService};
