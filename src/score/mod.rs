pub mod risk;
pub mod stability;

pub use risk::{RiskAssessment, RiskScorer};
pub use stability::StabilityAnalyzer;
