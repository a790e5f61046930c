//! The XP ledger: validated awards, append-only history, level queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use stride_core::config::ProgressionConfig;
use stride_core::errors::{EngineError, StorageError, ValidationError};
use stride_core::progression::{level_info_for, LevelInfo, ProgressionState, XpEvent};
use stride_storage::{codec, keys, PersistentStore};

/// The result of a successful XP award.
#[derive(Debug, Clone)]
pub struct XpAward {
    pub amount: i64,
    pub total_after: i64,
    pub level_before: LevelInfo,
    pub level_after: LevelInfo,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after.level > self.level_before.level
    }
}

/// Owns the learner's XP total and event history. Every successful
/// mutation is persisted before the call returns.
pub struct ProgressionLedger {
    state: ProgressionState,
    config: ProgressionConfig,
    store: Arc<dyn PersistentStore>,
}

impl ProgressionLedger {
    /// Load persisted progression state. An absent key starts empty; a
    /// corrupt payload is discarded with a warning and starts empty.
    pub fn load(
        store: Arc<dyn PersistentStore>,
        config: ProgressionConfig,
    ) -> Result<Self, EngineError> {
        let state: ProgressionState = codec::load_or_default(store.as_ref(), keys::PROGRESSION_STATE)?;
        Ok(Self {
            state,
            config,
            store,
        })
    }

    /// Award XP. Rejects non-positive amounts as a no-op validation
    /// failure. On success the event is prepended to history and the
    /// full state is persisted before returning; a persistence failure
    /// is surfaced even though the in-memory award already happened, so
    /// the caller can warn that progress may not be durable.
    pub fn add_xp(
        &mut self,
        amount: i64,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<XpAward, EngineError> {
        if amount <= 0 {
            return Err(ValidationError::NonPositiveXp { amount }.into());
        }

        let level_before = self.level_info();
        let total_after = self.state.total_xp + amount;
        self.state.history.insert(
            0,
            XpEvent {
                amount,
                source: source.to_string(),
                timestamp: now,
                total_after,
            },
        );
        self.state.total_xp = total_after;
        self.persist()?;

        let level_after = self.level_info();
        tracing::debug!(amount, source, total_after, "awarded XP");
        Ok(XpAward {
            amount,
            total_after,
            level_before,
            level_after,
        })
    }

    pub fn total_xp(&self) -> i64 {
        self.state.total_xp
    }

    /// Award history, most-recent-first.
    pub fn history(&self) -> &[XpEvent] {
        &self.state.history
    }

    /// Level standing for the current total.
    pub fn level_info(&self) -> LevelInfo {
        level_info_for(&self.config.levels, self.state.total_xp)
    }

    /// Level standing for an arbitrary total, against this ledger's
    /// threshold table.
    pub fn level_info_for_total(&self, total_xp: i64) -> LevelInfo {
        level_info_for(&self.config.levels, total_xp)
    }

    /// Zero XP and clear history. Explicit learner-initiated operation;
    /// completion sets have an independent lifecycle and are untouched.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.state = ProgressionState::default();
        self.persist()?;
        tracing::debug!("progression reset");
        Ok(())
    }

    fn persist(&self) -> Result<(), StorageError> {
        codec::save(self.store.as_ref(), keys::PROGRESSION_STATE, &self.state)
    }
}
