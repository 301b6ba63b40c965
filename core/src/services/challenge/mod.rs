//! OTP challenge lifecycle service
//!
//! Creation, atomic verify-and-consume, bounded resend, and lazy expiry.

mod config;
mod service;

pub use config::ChallengeServiceConfig;
pub use service::{ChallengeService, IssuedChallenge};

#[cfg(test)]
mod tests;
