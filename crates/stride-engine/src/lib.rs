//! # stride-engine
//!
//! The learner progression & personalization engine: the XP ledger,
//! exactly-once completion tracking, the learner profile, streak and
//! running-average derivation, achievements, and the deterministic
//! rule-based recommendation engine, all behind a per-learner session
//! facade with write-through persistence.

pub mod achievements;
pub mod catalog;
pub mod completion;
pub mod profile;
pub mod progression;
pub mod recommend;
pub mod session;
pub mod streak;

pub use catalog::{CourseCatalog, StaticCatalog};
pub use completion::CompletionTracker;
pub use profile::LearnerProfile;
pub use progression::{ProgressionLedger, XpAward};
pub use recommend::{Recommendation, RecommendationEngine, ScoreBreakdown};
pub use session::{ActivityOutcome, LearnerSession, NodeOutcome};
