//! Device fingerprint and device trust entities.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Days of inactivity after which a device is considered stale
pub const DEFAULT_MAX_DAYS_INACTIVE: i64 = 90;

/// Client-reported signals a fingerprint is derived from
///
/// The first three components are the core triple used for fuzzy matching;
/// the optional tail tolerates client-reported drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintComponents {
    pub user_agent: String,
    pub platform: String,
    pub timezone: String,
    pub language: Option<String>,
    pub screen_resolution: Option<String>,
    pub entropy: Option<String>,
}

/// A stable digest of client signals identifying a device
///
/// The `id` is minted fresh for every construction and is not derived from
/// the hash: two fingerprints built from identical components in independent
/// flows stay distinguishable by id while being recognized as the same
/// device by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFingerprint {
    pub id: Uuid,
    pub hash: String,
    pub components: FingerprintComponents,
}

impl DeviceFingerprint {
    /// Derive a fingerprint from client signals
    ///
    /// The hash is a SHA-256 digest over the canonical component tuple:
    /// identical inputs always produce identical hashes.
    pub fn new(components: FingerprintComponents) -> Self {
        let canonical = [
            components.user_agent.as_str(),
            components.platform.as_str(),
            components.timezone.as_str(),
            components.language.as_deref().unwrap_or(""),
            components.screen_resolution.as_deref().unwrap_or(""),
            components.entropy.as_deref().unwrap_or(""),
        ]
        .join("|");

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash = hex::encode(hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            hash,
            components,
        }
    }

    /// Compare against another fingerprint
    ///
    /// `strict` requires full hash equality. Fuzzy matching compares only the
    /// core triple (user agent, platform, timezone), tolerating drift in
    /// language, resolution, and entropy so a returning device is recognized
    /// despite minor client-reported variance.
    pub fn matches(&self, other: &DeviceFingerprint, strict: bool) -> bool {
        if strict {
            return self.hash == other.hash;
        }
        self.components.user_agent == other.components.user_agent
            && self.components.platform == other.components.platform
            && self.components.timezone == other.components.timezone
    }
}

/// A named, trust-scoped binding between a user and a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Same as the fingerprint id
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub fingerprint: DeviceFingerprint,

    /// Caller-policy trust flag
    pub trusted: bool,

    /// Push notification token, when the client registered one
    pub push_token: Option<String>,

    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Bind a fingerprint to a user
    pub fn new(user_id: Uuid, fingerprint: DeviceFingerprint, trusted: bool) -> Self {
        let now = Utc::now();
        Self {
            id: fingerprint.id,
            user_id,
            fingerprint,
            trusted,
            push_token: None,
            last_seen_at: now,
            created_at: now,
            revoked_at: None,
        }
    }

    /// Re-trust the device, clearing any revocation
    pub fn trust(&mut self) {
        self.trusted = true;
        self.revoked_at = None;
    }

    /// Revoke trust
    pub fn revoke(&mut self) {
        self.trusted = false;
        self.revoked_at = Some(Utc::now());
    }

    /// Record device activity
    pub fn mark_as_seen(&mut self) {
        self.last_seen_at = Utc::now();
    }

    pub fn update_push_token(&mut self, token: String) {
        self.push_token = Some(token);
    }

    /// Trusted and not revoked
    pub fn is_effectively_trusted(&self) -> bool {
        self.trusted && self.revoked_at.is_none()
    }

    /// Whether the device has been inactive longer than `max_days_inactive`
    pub fn is_stale(&self, max_days_inactive: i64) -> bool {
        Utc::now() - self.last_seen_at > Duration::days(max_days_inactive)
    }
}
