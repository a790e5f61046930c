//! # stride-core
//!
//! Core types, errors, config, and events for the Stride learner
//! progression engine: XP events and level derivation, learner
//! preferences and performance metrics, catalog course records, and
//! the synchronous event channel.

pub mod config;
pub mod course;
pub mod errors;
pub mod events;
pub mod profile;
pub mod progression;
pub mod trace;

pub use config::StrideConfig;
pub use course::{Course, Difficulty};
pub use errors::{EngineError, NotFoundError, StorageError, StrideErrorCode, ValidationError};
pub use profile::{
    LearnerPreferences, LearningStats, LearningStyle, MetricsUpdate, Pace, PerformanceMetrics,
    PreferencesUpdate, ProfileState,
};
pub use progression::{level_info_for, LevelInfo, ProgressionState, XpEvent};
