//! Weighted heuristic risk scoring for authentication attempts
//!
//! The detector combines velocity counters, static user-agent checks, IP
//! range checks, and a disposable-domain lookup into a deterministic risk
//! score. Given the same counter state and input, the score is always the
//! same; there is no randomness and no learned model. The only side effect
//! is incrementing velocity counters.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use ipnetwork::Ipv4Network;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use shared::config::abuse::AbusePolicyConfig;

use crate::errors::DomainResult;
use crate::repositories::CounterStore;

/// Bot and crawler user-agent patterns
static BOT_UA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(bot|crawler|spider|curl|wget|python-requests|httpclient|scrapy|headless)")
        .expect("invalid bot user-agent regex")
});

/// Private and carrier-grade NAT ranges often fronting proxies
static SUSPICIOUS_V4_RANGES: Lazy<Vec<Ipv4Network>> = Lazy::new(|| {
    ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "100.64.0.0/10"]
        .iter()
        .map(|range| range.parse().expect("invalid suspicious range"))
        .collect()
});

/// Everything the detector knows about one attempt
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    /// SHA-256 hash of the normalized identifier
    pub identifier_hash: String,
    /// Domain part of an email identifier, when the identifier is an email
    pub email_domain: Option<String>,
    /// Client IP as reported by the transport
    pub ip: String,
    /// ISO country code from upstream geo resolution, when available
    pub country: Option<String>,
    pub user_agent: Option<String>,
}

/// Individual signals that contributed to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbuseSignal {
    IdentifierVelocity,
    IpVelocity,
    GeoSwitch,
    SuspiciousUserAgent,
    SuspiciousIp,
    DisposableDomain,
}

impl AbuseSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbuseSignal::IdentifierVelocity => "identifier_velocity",
            AbuseSignal::IpVelocity => "ip_velocity",
            AbuseSignal::GeoSwitch => "geo_switch",
            AbuseSignal::SuspiciousUserAgent => "suspicious_user_agent",
            AbuseSignal::SuspiciousIp => "suspicious_ip",
            AbuseSignal::DisposableDomain => "disposable_domain",
        }
    }
}

/// Recommended handling for a scored attempt
///
/// The detector only recommends; acting on the recommendation is the
/// caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskAction {
    Allow,
    /// Require a step-up (CAPTCHA or equivalent) before proceeding
    Challenge,
    Block,
}

/// Score, action, and the signals behind them
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    /// Weighted signal sum clamped to [0, 1]
    pub score: f64,
    pub action: RiskAction,
    pub signals: Vec<AbuseSignal>,
}

impl RiskAssessment {
    pub fn is_blocked(&self) -> bool {
        self.action == RiskAction::Block
    }
}

/// Heuristic abuse detector over the shared counter store
pub struct AbuseDetector<C: CounterStore> {
    counters: Arc<C>,
    config: AbusePolicyConfig,
    /// Known disposable email domains, lowercased
    disposable_domains: Arc<HashSet<String>>,
}

impl<C: CounterStore> AbuseDetector<C> {
    pub fn new(
        counters: Arc<C>,
        config: AbusePolicyConfig,
        disposable_domains: Arc<HashSet<String>>,
    ) -> Self {
        Self {
            counters,
            config,
            disposable_domains,
        }
    }

    /// Score one attempt and recommend an action
    ///
    /// Increments the velocity counters for the attempt as a side effect;
    /// everything else is a pure read.
    pub async fn assess(&self, context: &AssessmentContext) -> DomainResult<RiskAssessment> {
        let weights = self.config.weights;
        let mut signals = Vec::new();
        let mut score = 0.0;

        if self.identifier_velocity_tripped(&context.identifier_hash).await? {
            signals.push(AbuseSignal::IdentifierVelocity);
            score += weights.identifier_velocity;
        }

        if self.ip_velocity_tripped(&context.ip).await? {
            signals.push(AbuseSignal::IpVelocity);
            score += weights.ip_velocity;
        }

        if let Some(country) = &context.country {
            if self
                .geo_switch_tripped(&context.identifier_hash, country)
                .await?
            {
                signals.push(AbuseSignal::GeoSwitch);
                score += weights.geo_velocity;
            }
        }

        if self.user_agent_suspicious(context.user_agent.as_deref()) {
            signals.push(AbuseSignal::SuspiciousUserAgent);
            score += weights.user_agent;
        }

        if self.ip_suspicious(&context.ip) {
            signals.push(AbuseSignal::SuspiciousIp);
            score += weights.suspicious_ip;
        }

        if let Some(domain) = &context.email_domain {
            if self.disposable_domains.contains(&domain.to_lowercase()) {
                signals.push(AbuseSignal::DisposableDomain);
                score += weights.disposable_domain;
            }
        }

        let score = score.clamp(0.0, 1.0);
        let action = if score >= self.config.thresholds.block {
            RiskAction::Block
        } else if score >= self.config.thresholds.challenge {
            RiskAction::Challenge
        } else {
            RiskAction::Allow
        };

        match action {
            RiskAction::Block => warn!(
                score = score,
                signals = ?signals.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                event = "abuse_blocked",
                "Risk score above block threshold"
            ),
            _ => debug!(
                score = score,
                action = ?action,
                event = "abuse_assessed",
                "Attempt scored"
            ),
        }

        Ok(RiskAssessment {
            score,
            action,
            signals,
        })
    }

    async fn identifier_velocity_tripped(&self, identifier_hash: &str) -> DomainResult<bool> {
        let velocity = self.config.velocity;
        let key = format!("abuse:identifier#{}", identifier_hash);
        let counter = self
            .counters
            .increment(&key, velocity.window_seconds)
            .await?;
        Ok(counter.count > velocity.identifier_trip)
    }

    async fn ip_velocity_tripped(&self, ip: &str) -> DomainResult<bool> {
        let velocity = self.config.velocity;
        let key = format!("abuse:ip#{}", Self::hash_ip(ip));
        let counter = self
            .counters
            .increment(&key, velocity.window_seconds)
            .await?;
        Ok(counter.count > velocity.ip_trip)
    }

    /// Count distinct countries an identifier has been seen from
    ///
    /// Each (identifier, country) pair keeps its own window counter; the
    /// first increment of a fresh pair window counts one "switch" on the
    /// identifier's switch counter. The signal trips when the identifier
    /// has been seen from more than `geo_trip` countries in the window.
    async fn geo_switch_tripped(&self, identifier_hash: &str, country: &str) -> DomainResult<bool> {
        let velocity = self.config.velocity;
        let pair_key = format!(
            "abuse:geo#{}#{}",
            identifier_hash,
            country.to_uppercase()
        );
        let pair = self
            .counters
            .increment(&pair_key, velocity.window_seconds)
            .await?;

        if pair.count == 1 {
            let switch_key = format!("abuse:geoswitch#{}", identifier_hash);
            let switches = self
                .counters
                .increment(&switch_key, velocity.window_seconds)
                .await?;
            return Ok(switches.count > velocity.geo_trip);
        }

        // Repeat request from a known country; read the switch counter
        // without counting a new switch. A lapsed window is dead state
        // awaiting eviction and must not be read as a live count.
        let switch_key = format!("abuse:geoswitch#{}", identifier_hash);
        match self.counters.get(&switch_key).await? {
            Some(switches) if Utc::now() < switches.expires_at => {
                Ok(switches.count > velocity.geo_trip)
            }
            _ => Ok(false),
        }
    }

    fn user_agent_suspicious(&self, user_agent: Option<&str>) -> bool {
        match user_agent {
            None => true,
            Some(ua) => {
                let ua = ua.trim();
                ua.len() < self.config.min_user_agent_len || BOT_UA_REGEX.is_match(ua)
            }
        }
    }

    fn ip_suspicious(&self, ip: &str) -> bool {
        match ip.parse::<IpAddr>() {
            Ok(IpAddr::V4(ipv4)) => SUSPICIOUS_V4_RANGES
                .iter()
                .any(|network| network.contains(ipv4)),
            // fc00::/7 unique-local prefix; the stdlib predicate is unstable
            Ok(IpAddr::V6(ipv6)) => ipv6.is_loopback() || (ipv6.segments()[0] & 0xfe00) == 0xfc00,
            // Unparseable IPs are a transport bug, not an abuse signal
            Err(_) => false,
        }
    }

    /// Raw IPs never reach the counter store
    fn hash_ip(ip: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hex::encode(hasher.finalize())
    }
}
