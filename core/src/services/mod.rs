//! Domain services for the passwordless authentication flow

pub mod abuse;
pub mod auth;
pub mod challenge;
pub mod delivery;
pub mod device;
pub mod magic_link;
pub mod rate_limit;
pub mod suppression;

pub use abuse::{AbuseDetector, AbuseSignal, AssessmentContext, RiskAction, RiskAssessment};
pub use auth::{AuthAttempt, AuthService, ChallengeStarted, MagicLinkStarted, VerifiedAuth};
pub use challenge::{ChallengeService, ChallengeServiceConfig, IssuedChallenge};
pub use delivery::DeliveryProviderTrait;
pub use device::{DeviceService, DeviceServiceConfig};
pub use magic_link::{MagicLinkClaims, MagicLinkConfig, MagicLinkService};
pub use rate_limit::{RateLimitDecision, RateLimitScope, RateLimiter};
pub use suppression::{SuppressionConfig, SuppressionService};
