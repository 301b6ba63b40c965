//! Suppression entities: denylist entries and delivery feedback records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an identifier was added to the denylist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Repeated permanent delivery failures
    HardBounce,
    /// Recipient reported the message as spam
    Complaint,
    /// Risk score crossed the block threshold
    AbuseDetected,
    /// Operator-initiated block
    Manual { note: String },
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::HardBounce => "hard_bounce",
            BlockReason::Complaint => "complaint",
            BlockReason::AbuseDetected => "abuse_detected",
            BlockReason::Manual { .. } => "manual",
        }
    }
}

/// A suppressed identifier
///
/// Absence of `expires_at` means the block is permanent. An entry past its
/// expiry is treated as not blocking and removed lazily on the next lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenylistEntry {
    pub identifier_hash: String,
    pub reason: BlockReason,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DenylistEntry {
    /// Create a permanent entry
    pub fn permanent(identifier_hash: String, reason: BlockReason) -> Self {
        Self {
            identifier_hash,
            reason,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Create an entry that lapses at `expires_at`
    pub fn temporary(
        identifier_hash: String,
        reason: BlockReason,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier_hash,
            reason,
            created_at: Utc::now(),
            expires_at: Some(expires_at),
        }
    }

    /// Whether the entry has lapsed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

/// Delivery failure classification reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BounceClass {
    /// Hard failure; the address will never deliver
    Permanent,
    /// Soft failure; mailbox full, provider hiccup
    Transient,
}

/// An append-only delivery failure record
///
/// Keyed by (identifier_hash, occurred_at, message_id) so redelivered
/// upstream notifications are distinguishable; re-processing the same event
/// stays safe because escalation thresholds are conservative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BounceRecord {
    pub identifier_hash: String,
    pub classification: BounceClass,
    pub message_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl BounceRecord {
    pub fn new(identifier_hash: String, classification: BounceClass, message_id: String) -> Self {
        Self {
            identifier_hash,
            classification,
            message_id,
            occurred_at: Utc::now(),
        }
    }
}

/// An append-only spam complaint record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub identifier_hash: String,
    pub message_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl ComplaintRecord {
    pub fn new(identifier_hash: String, message_id: String) -> Self {
        Self {
            identifier_hash,
            message_id,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_permanent_entry_never_expires() {
        let entry = DenylistEntry::permanent("hash".to_string(), BlockReason::Complaint);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_temporary_entry_lapses() {
        let past = Utc::now() - Duration::minutes(1);
        let entry = DenylistEntry::temporary("hash".to_string(), BlockReason::AbuseDetected, past);
        assert!(entry.is_expired());

        let future = Utc::now() + Duration::minutes(10);
        let entry = DenylistEntry::temporary("hash".to_string(), BlockReason::AbuseDetected, future);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_block_reason_codes() {
        assert_eq!(BlockReason::HardBounce.as_str(), "hard_bounce");
        assert_eq!(
            BlockReason::Manual {
                note: "fraud team".to_string()
            }
            .as_str(),
            "manual"
        );
    }
}
