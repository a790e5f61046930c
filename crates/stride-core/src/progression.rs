//! XP events, progression state, and level derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LevelThreshold;

/// A single XP award. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
    /// Awarded amount, always positive.
    pub amount: i64,
    /// What earned the XP, e.g. `node:css-selectors` or `quiz:q-12`.
    pub source: String,
    pub timestamp: DateTime<Utc>,
    /// Running total immediately after this event.
    pub total_after: i64,
}

/// Total XP plus the append-only event history, most-recent-first.
///
/// Invariants: `total_xp` equals the sum of all history amounts, and
/// the history length equals the number of successful awards since the
/// last reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
    pub total_xp: i64,
    pub history: Vec<XpEvent>,
}

/// Derived level standing for a given XP total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub title: String,
    /// XP earned past the current level's threshold.
    pub xp_into_level: i64,
    /// XP span between the current and next thresholds; 0 at the top.
    pub xp_for_next_level: i64,
    /// Percentage progress toward the next level; 100 at the top.
    pub progress_pct: u8,
}

/// Resolve the level standing for `total_xp` against an ascending
/// threshold table. Pure and monotonic: more XP never yields a lower
/// level.
pub fn level_info_for(levels: &[LevelThreshold], total_xp: i64) -> LevelInfo {
    debug_assert!(!levels.is_empty(), "level table must not be empty");

    let mut current = &levels[0];
    let mut next: Option<&LevelThreshold> = None;
    for (i, threshold) in levels.iter().enumerate().rev() {
        if total_xp >= threshold.xp {
            current = threshold;
            next = levels.get(i + 1);
            break;
        }
    }

    let xp_into_level = total_xp - current.xp;
    let xp_for_next_level = next.map(|n| n.xp - current.xp).unwrap_or(0);
    let progress_pct = if xp_for_next_level > 0 {
        ((xp_into_level as f64 / xp_for_next_level as f64) * 100.0).floor() as u8
    } else {
        100
    };

    LevelInfo {
        level: current.level,
        title: current.title.clone(),
        xp_into_level,
        xp_for_next_level,
        progress_pct,
    }
}
