//! Contact identifier value object
//!
//! Normalizes a raw contact string into a typed, canonical value (email or
//! phone) plus a stable one-way hash. The hash is the partition key for all
//! per-contact state (challenges, counters, suppression), so it is computed
//! once at construction and never changes for the object's lifetime.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AuthError;

/// Loose phone-shape pattern used for classification: an optional leading
/// `+` followed by digits with common formatting characters
static PHONE_SHAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ().\-]{5,19}$").unwrap()
});

/// Canonical E.164 format: + followed by a country code that does not start
/// with 0 and up to 15 digits total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{6,14}$").unwrap()
});

/// Syntactic email check; deliverability is the provider's problem
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").unwrap()
});

/// The kind of contact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Email,
    Phone,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Email => "email",
            IdentifierKind::Phone => "phone",
        }
    }
}

/// A normalized contact identifier (email or phone)
///
/// Two identifiers are equal iff canonical value and kind match. Hash
/// equality follows from value equality, not the other way around, so the
/// (value, kind) pair stays the authoritative equality key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    value: String,
    kind: IdentifierKind,
    hash: String,
}

impl Identifier {
    /// Parse and normalize a raw contact string
    ///
    /// Input is classified heuristically: anything matching a loose
    /// phone-shape pattern is treated as a phone and normalized to E.164;
    /// everything else must be a syntactically valid email, which is trimmed
    /// and lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidIdentifier` if the input is neither a
    /// normalizable phone number nor a valid email address.
    pub fn new(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuthError::InvalidIdentifier);
        }

        if PHONE_SHAPE_REGEX.is_match(trimmed) {
            let canonical = normalize_phone(trimmed).ok_or(AuthError::InvalidIdentifier)?;
            return Ok(Self::from_canonical(canonical, IdentifierKind::Phone));
        }

        let lowered = trimmed.to_lowercase();
        if EMAIL_REGEX.is_match(&lowered) {
            return Ok(Self::from_canonical(lowered, IdentifierKind::Email));
        }

        Err(AuthError::InvalidIdentifier)
    }

    /// Reconstruct an identifier from an already-canonical value
    ///
    /// Used when rebuilding from trusted storage or verified token claims;
    /// performs no validation beyond recomputing the hash.
    pub fn from_canonical(value: String, kind: IdentifierKind) -> Self {
        let hash = hash_value(&value);
        Self { value, kind, hash }
    }

    /// The canonical value (E.164 phone or lower-cased email)
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Stable one-way hash of the canonical value, hex-encoded
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The email domain, when this identifier is an email
    pub fn email_domain(&self) -> Option<&str> {
        match self.kind {
            IdentifierKind::Email => self.value.rsplit('@').next(),
            IdentifierKind::Phone => None,
        }
    }

    /// Masked representation safe for logging
    pub fn masked(&self) -> String {
        match self.kind {
            IdentifierKind::Phone => {
                if self.value.len() <= 4 {
                    "*".repeat(self.value.len())
                } else {
                    format!("***{}", &self.value[self.value.len() - 4..])
                }
            }
            IdentifierKind::Email => {
                let (local, domain) = self.value.split_once('@').unwrap_or((self.value.as_str(), ""));
                let head = local.chars().next().map(String::from).unwrap_or_default();
                format!("{}***@{}", head, domain)
            }
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.kind == other.kind
    }
}

impl Eq for Identifier {}

/// Normalize a phone-shaped string to E.164
///
/// Formatting characters are stripped; a bare national-length number keeps
/// its digits and gains a leading `+`. Returns `None` when the digits do not
/// form a plausible international number.
fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let candidate = format!("+{}", digits);
    if E164_REGEX.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// SHA-256 hash of a canonical identifier value, hex-encoded
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
