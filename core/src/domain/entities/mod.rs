//! Domain entities representing core business objects.

pub mod challenge;
pub mod device;
pub mod identifier;
pub mod suppression;

// Re-export commonly used types
pub use challenge::{
    AuthIntent, Channel, ChallengeStatus, OtpChallenge, DEFAULT_CODE_LENGTH,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RESENDS, DEFAULT_VALIDITY_MINUTES,
};
pub use device::{Device, DeviceFingerprint, FingerprintComponents, DEFAULT_MAX_DAYS_INACTIVE};
pub use identifier::{Identifier, IdentifierKind};
pub use suppression::{BlockReason, BounceClass, BounceRecord, ComplaintRecord, DenylistEntry};
