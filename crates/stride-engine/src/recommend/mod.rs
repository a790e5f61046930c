//! Deterministic rule-based course recommendation.

pub mod engine;
pub mod factors;

pub use engine::{Recommendation, RecommendationEngine};
pub use factors::ScoreBreakdown;
