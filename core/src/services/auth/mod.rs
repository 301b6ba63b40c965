//! Authentication flow orchestration service

mod service;

pub use service::{
    AuthAttempt, AuthService, ChallengeStarted, MagicLinkStarted, VerifiedAuth,
};

#[cfg(test)]
mod tests;
