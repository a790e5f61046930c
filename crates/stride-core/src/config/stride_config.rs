//! Top-level Stride configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{LevelThreshold, ProgressionConfig, RecommendConfig, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`STRIDE_*`)
/// 2. Project config (`stride.toml` in the host root)
/// 3. User config (`~/.stride/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrideConfig {
    pub progression: ProgressionConfig,
    pub recommend: RecommendConfig,
    pub storage: StorageConfig,
}

/// Partial config parsed from a single layer. Only `Some` values
/// override the layer below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    progression: ProgressionOverlay,
    recommend: RecommendOverlay,
    storage: StorageOverlay,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ProgressionOverlay {
    node_reward: Option<i64>,
    lesson_reward: Option<i64>,
    quiz_reward: Option<i64>,
    perfect_quiz_bonus: Option<i64>,
    assignment_reward: Option<i64>,
    peer_evaluation_reward: Option<i64>,
    course_reward: Option<i64>,
    levels: Option<Vec<LevelThreshold>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RecommendOverlay {
    skill_match_bonus: Option<f64>,
    difficulty_exact_bonus: Option<f64>,
    difficulty_adjacent_bonus: Option<f64>,
    prerequisite_bonus: Option<f64>,
    popularity_divisor: Option<f64>,
    completed_floor: Option<f64>,
    in_progress_floor: Option<f64>,
    top_k: Option<usize>,
    cold_start_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StorageOverlay {
    db_path: Option<std::path::PathBuf>,
}

impl StrideConfig {
    /// Load configuration with layered resolution, then validate.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config.
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                let overlay = parse_overlay_file(&user_config_path)?;
                apply_overlay(&mut config, &overlay);
            }
        }

        // Project config.
        let project_config_path = root.join("stride.toml");
        if project_config_path.exists() {
            let overlay = parse_overlay_file(&project_config_path)?;
            apply_overlay(&mut config, &overlay);
        }

        // Highest priority: environment variables.
        apply_env_overrides(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing and hosts
    /// that manage their own files).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let overlay: ConfigOverlay =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        apply_overlay(&mut config, &overlay);
        config.validate()?;
        Ok(config)
    }

    /// Validate all sub-configs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.progression.validate()?;
        self.recommend.validate()?;
        Ok(())
    }

    /// Serialize the effective config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_overlay_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge an overlay into the config. Only `Some` values override.
fn apply_overlay(config: &mut StrideConfig, overlay: &ConfigOverlay) {
    let p = &overlay.progression;
    if let Some(v) = p.node_reward {
        config.progression.node_reward = v;
    }
    if let Some(v) = p.lesson_reward {
        config.progression.lesson_reward = v;
    }
    if let Some(v) = p.quiz_reward {
        config.progression.quiz_reward = v;
    }
    if let Some(v) = p.perfect_quiz_bonus {
        config.progression.perfect_quiz_bonus = v;
    }
    if let Some(v) = p.assignment_reward {
        config.progression.assignment_reward = v;
    }
    if let Some(v) = p.peer_evaluation_reward {
        config.progression.peer_evaluation_reward = v;
    }
    if let Some(v) = p.course_reward {
        config.progression.course_reward = v;
    }
    if let Some(ref v) = p.levels {
        config.progression.levels = v.clone();
    }

    let r = &overlay.recommend;
    if let Some(v) = r.skill_match_bonus {
        config.recommend.skill_match_bonus = v;
    }
    if let Some(v) = r.difficulty_exact_bonus {
        config.recommend.difficulty_exact_bonus = v;
    }
    if let Some(v) = r.difficulty_adjacent_bonus {
        config.recommend.difficulty_adjacent_bonus = v;
    }
    if let Some(v) = r.prerequisite_bonus {
        config.recommend.prerequisite_bonus = v;
    }
    if let Some(v) = r.popularity_divisor {
        config.recommend.popularity_divisor = v;
    }
    if let Some(v) = r.completed_floor {
        config.recommend.completed_floor = v;
    }
    if let Some(v) = r.in_progress_floor {
        config.recommend.in_progress_floor = v;
    }
    if let Some(v) = r.top_k {
        config.recommend.top_k = v;
    }
    if let Some(v) = r.cold_start_limit {
        config.recommend.cold_start_limit = v;
    }

    if let Some(ref v) = overlay.storage.db_path {
        config.storage.db_path = Some(v.clone());
    }
}

/// Apply environment variable overrides.
/// Pattern: `STRIDE_NODE_REWARD`, `STRIDE_TOP_K`, `STRIDE_DB_PATH`.
fn apply_env_overrides(config: &mut StrideConfig) {
    if let Ok(val) = std::env::var("STRIDE_NODE_REWARD") {
        if let Ok(v) = val.parse::<i64>() {
            config.progression.node_reward = v;
        }
    }
    if let Ok(val) = std::env::var("STRIDE_COURSE_REWARD") {
        if let Ok(v) = val.parse::<i64>() {
            config.progression.course_reward = v;
        }
    }
    if let Ok(val) = std::env::var("STRIDE_TOP_K") {
        if let Ok(v) = val.parse::<usize>() {
            config.recommend.top_k = v;
        }
    }
    if let Ok(val) = std::env::var("STRIDE_DB_PATH") {
        config.storage.db_path = Some(std::path::PathBuf::from(val));
    }
}

/// Returns the user config path: `~/.stride/config.toml`.
fn user_config_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".stride").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
