//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Rate limiting configuration
///
/// Each scope carries its own fixed-window rule. Scopes are evaluated
/// independently by the limiter; combining decisions across scopes is the
/// caller's responsibility.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Limit per contact identifier (email or phone hash)
    pub identifier: ScopeLimit,

    /// Limit per client IP address
    pub ip: ScopeLimit,

    /// Global limit across all requests
    pub global: ScopeLimit,
}

/// A single fixed-window rule: at most `max_attempts` increments per window
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScopeLimit {
    /// Maximum attempts within one window
    pub max_attempts: u32,

    /// Window duration in seconds
    pub window_seconds: u64,
}

impl ScopeLimit {
    /// Create a new scope limit
    pub const fn new(max_attempts: u32, window_seconds: u64) -> Self {
        Self {
            max_attempts,
            window_seconds,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            identifier: ScopeLimit::new(5, 3600),
            ip: ScopeLimit::new(10, 3600),
            global: ScopeLimit::new(1000, 3600),
        }
    }
}

impl RateLimitConfig {
    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            enabled: true,
            identifier: ScopeLimit::new(100, 3600),
            ip: ScopeLimit::new(200, 3600),
            global: ScopeLimit::new(10_000, 3600),
        }
    }

    /// Production limits (the documented defaults)
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.identifier.max_attempts, 5);
        assert_eq!(config.ip.max_attempts, 10);
        assert_eq!(config.global.max_attempts, 1000);
        assert_eq!(config.identifier.window_seconds, 3600);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "identifier": { "max_attempts": 3, "window_seconds": 600 },
            "ip": { "max_attempts": 20, "window_seconds": 3600 },
            "global": { "max_attempts": 500, "window_seconds": 3600 }
        }"#;
        let config: RateLimitConfig = serde_json::from_str(json).unwrap();
        assert!(config.enabled);
        assert_eq!(config.identifier.max_attempts, 3);
        assert_eq!(config.identifier.window_seconds, 600);
    }
}
