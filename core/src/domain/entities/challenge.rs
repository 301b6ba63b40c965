//! OTP challenge entity and its lifecycle state machine.
//!
//! A challenge holds only the SHA-256 hash of its code; the plaintext exists
//! transiently at creation/resend time for delivery and is never persisted.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of a generated verification code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default validity window for a challenge (minutes)
pub const DEFAULT_VALIDITY_MINUTES: i64 = 5;

/// Default maximum number of verification attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default maximum number of resends per challenge
pub const DEFAULT_MAX_RESENDS: u32 = 2;

/// Delivery channel for a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Email,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Email => "email",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

/// What the authentication proof is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthIntent {
    SignIn,
    SignUp,
    StepUp,
}

impl AuthIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthIntent::SignIn => "sign_in",
            AuthIntent::SignUp => "sign_up",
            AuthIntent::StepUp => "step_up",
        }
    }
}

/// Challenge lifecycle status
///
/// `Pending` is the only non-terminal state. Once a challenge is `Verified`,
/// `Failed`, or `Expired`, no further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Verified,
    Failed,
    Expired,
}

impl ChallengeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChallengeStatus::Pending)
    }
}

/// One-time code challenge for passwordless sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Unique identifier for the challenge
    pub id: Uuid,

    /// Hash of the contact identifier this challenge belongs to
    pub identifier_hash: String,

    /// Channel the code was delivered over
    pub channel: Channel,

    /// Purpose of the authentication attempt
    pub intent: AuthIntent,

    /// SHA-256 hash of the current code; never the plaintext
    pub code_hash: String,

    /// Number of verification attempts made against the current code set
    pub attempts: u32,

    /// Maximum verification attempts before the challenge fails
    pub max_attempts: u32,

    /// Number of times a fresh code has been issued for this challenge
    pub resend_count: u32,

    /// Maximum resends allowed
    pub max_resends: u32,

    /// Timestamp when the challenge was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the challenge expires
    pub expires_at: DateTime<Utc>,

    /// Current lifecycle status
    pub status: ChallengeStatus,
}

impl OtpChallenge {
    /// Create a new pending challenge from a plaintext code
    ///
    /// Only the hash of `plaintext_code` is retained. A negative validity
    /// produces an already-expired challenge, which verification treats the
    /// same as any other expired one.
    pub fn new(
        identifier_hash: String,
        channel: Channel,
        intent: AuthIntent,
        plaintext_code: &str,
        validity_minutes: i64,
        max_attempts: u32,
        max_resends: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            identifier_hash,
            channel,
            intent,
            code_hash: Self::hash_code(plaintext_code),
            attempts: 0,
            max_attempts,
            resend_count: 0,
            max_resends,
            created_at: now,
            expires_at: now + Duration::minutes(validity_minutes),
            status: ChallengeStatus::Pending,
        }
    }

    /// Generate a cryptographically secure fixed-length decimal code
    ///
    /// Drawn uniformly from `[10^(length-1), 10^length - 1]` so the code
    /// always has exactly `length` digits. Uses the OS CSPRNG; a predictable
    /// code is a direct authentication bypass. Lengths outside `1..=18`
    /// (the widest decimal range a `u64` can hold) are clamped.
    pub fn generate_code(length: usize) -> String {
        let length = length.clamp(1, 18);
        let low = 10u64.pow(length as u32 - 1);
        let high = 10u64.pow(length as u32) - 1;
        let code = OsRng.gen_range(low..=high);
        code.to_string()
    }

    /// SHA-256 hash of a plaintext code, hex-encoded
    pub fn hash_code(plaintext_code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext_code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Constant-time check of a submitted code against the stored hash
    pub fn code_matches(&self, submitted_code: &str) -> bool {
        let submitted_hash = Self::hash_code(submitted_code);
        constant_time_eq(submitted_hash.as_bytes(), self.code_hash.as_bytes())
    }

    /// Whether the challenge is past its validity window
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether a verification attempt may be made
    pub fn can_attempt(&self) -> bool {
        self.status == ChallengeStatus::Pending
            && !self.is_expired()
            && self.attempts < self.max_attempts
    }

    /// Whether a fresh code may still be issued
    pub fn can_resend(&self) -> bool {
        self.status == ChallengeStatus::Pending
            && !self.is_expired()
            && self.resend_count < self.max_resends
    }

    /// Attempts left before the challenge fails
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    /// Transition to `Verified`; fails on any non-pending or expired state
    pub fn mark_verified(&mut self) -> bool {
        if self.status != ChallengeStatus::Pending || self.is_expired() {
            return false;
        }
        self.status = ChallengeStatus::Verified;
        true
    }

    /// Transition to `Failed`; fails on any non-pending state
    pub fn mark_failed(&mut self) -> bool {
        if self.status != ChallengeStatus::Pending {
            return false;
        }
        self.status = ChallengeStatus::Failed;
        true
    }

    /// Transition to `Expired`; fails on any non-pending state
    pub fn mark_expired(&mut self) -> bool {
        if self.status != ChallengeStatus::Pending {
            return false;
        }
        self.status = ChallengeStatus::Expired;
        true
    }

    /// Record a failed verification attempt, returning the new count
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Replace the code for a resend, resetting the attempt counter
    ///
    /// Returns `false` without mutating anything when the resend cap is
    /// reached, the challenge is expired, or it is no longer pending.
    pub fn apply_resend(&mut self, new_plaintext_code: &str) -> bool {
        if !self.can_resend() {
            return false;
        }
        self.code_hash = Self::hash_code(new_plaintext_code);
        self.resend_count += 1;
        self.attempts = 0;
        true
    }
}
