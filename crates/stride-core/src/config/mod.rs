//! Configuration for the Stride engine.

pub mod progression_config;
pub mod recommend_config;
pub mod storage_config;
pub mod stride_config;

pub use progression_config::{LevelThreshold, ProgressionConfig};
pub use recommend_config::RecommendConfig;
pub use storage_config::StorageConfig;
pub use stride_config::StrideConfig;
