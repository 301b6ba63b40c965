//! Abuse scoring policy configuration
//!
//! The abuse detector is a fixed weighted heuristic, not a trained model. The
//! weights and thresholds below are a starting configuration inferred from
//! observed traffic; operators are expected to tune them per deployment
//! without code changes.

use serde::{Deserialize, Serialize};

/// Complete abuse scoring policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbusePolicyConfig {
    /// Contribution of each triggered signal to the risk score
    #[serde(default)]
    pub weights: SignalWeights,

    /// Score thresholds mapping to block/challenge actions
    #[serde(default)]
    pub thresholds: ActionThresholds,

    /// Velocity counter windows and trip limits
    #[serde(default)]
    pub velocity: VelocityWindows,

    /// Minimum user-agent length considered plausible for a real client
    #[serde(default = "default_min_user_agent_len")]
    pub min_user_agent_len: usize,
}

/// Per-signal score weights, summed and clamped to [0, 1]
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SignalWeights {
    /// Too many requests for one identifier inside the velocity window
    pub identifier_velocity: f64,
    /// Too many requests from one IP inside the velocity window
    pub ip_velocity: f64,
    /// Identifier seen from multiple countries inside the velocity window
    pub geo_velocity: f64,
    /// Bot-like, empty, or implausibly short user agent
    pub user_agent: f64,
    /// Request from a private/proxy IP range
    pub suspicious_ip: f64,
    /// Email identifier on a known disposable domain
    pub disposable_domain: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            identifier_velocity: 0.3,
            ip_velocity: 0.3,
            geo_velocity: 0.2,
            user_agent: 0.1,
            suspicious_ip: 0.1,
            disposable_domain: 0.2,
        }
    }
}

/// Score thresholds for the recommended action
///
/// `score >= block` blocks the attempt, `score >= challenge` requires a
/// step-up (CAPTCHA or equivalent), anything below is allowed.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ActionThresholds {
    pub block: f64,
    pub challenge: f64,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        Self {
            block: 0.8,
            challenge: 0.5,
        }
    }
}

/// Velocity counter configuration per signal
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct VelocityWindows {
    /// Window for all velocity counters, in seconds
    pub window_seconds: u64,
    /// Requests per identifier before the identifier-velocity signal trips
    pub identifier_trip: u32,
    /// Requests per IP before the ip-velocity signal trips
    pub ip_trip: u32,
    /// Distinct countries per identifier before the geo signal trips
    pub geo_trip: u32,
}

impl Default for VelocityWindows {
    fn default() -> Self {
        Self {
            window_seconds: 3600,
            identifier_trip: 10,
            ip_trip: 20,
            geo_trip: 2,
        }
    }
}

impl Default for AbusePolicyConfig {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            thresholds: ActionThresholds::default(),
            velocity: VelocityWindows::default(),
            min_user_agent_len: default_min_user_agent_len(),
        }
    }
}

impl AbusePolicyConfig {
    /// A stricter profile for deployments under active attack
    pub fn strict() -> Self {
        Self {
            weights: SignalWeights {
                ip_velocity: 0.4,
                ..SignalWeights::default()
            },
            thresholds: ActionThresholds {
                block: 0.7,
                challenge: 0.4,
            },
            velocity: VelocityWindows {
                identifier_trip: 5,
                ip_trip: 10,
                ..VelocityWindows::default()
            },
            min_user_agent_len: default_min_user_agent_len(),
        }
    }
}

fn default_min_user_agent_len() -> usize {
    10
}
