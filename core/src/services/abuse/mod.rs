//! Heuristic abuse detection
//!
//! Velocity counters plus static request heuristics, combined into a
//! deterministic weighted risk score and a recommended action.

mod detector;

pub use detector::{
    AbuseDetector, AbuseSignal, AssessmentContext, RiskAction, RiskAssessment,
};
