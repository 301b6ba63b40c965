//! Configuration for the magic link service

/// Configuration for magic link signing and delivery
#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    /// HS256 signing secret
    pub secret: String,
    /// Previous signing secret, accepted for verification only during
    /// key rotation
    pub previous_secret: Option<String>,
    /// Link validity in minutes
    pub validity_minutes: i64,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Base URL the token is appended to when building the clickable link
    pub base_url: String,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-please-change-in-production".to_string(),
            previous_secret: None,
            validity_minutes: 15,
            issuer: "keyless".to_string(),
            audience: "keyless-auth".to_string(),
            base_url: "https://localhost/auth/link".to_string(),
        }
    }
}
