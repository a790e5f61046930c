//! Exactly-once roadmap node completion tracking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};

use stride_core::errors::{EngineError, StorageError};
use stride_storage::{codec, keys, PersistentStore};

use crate::progression::ProgressionLedger;

/// Owns, per roadmap, the set of completed node ids. Entries are
/// append-only: the core never removes them, and the progression
/// reset does not touch them.
pub struct CompletionTracker {
    sets: FxHashMap<String, FxHashSet<String>>,
    node_reward: i64,
    store: Arc<dyn PersistentStore>,
}

impl CompletionTracker {
    /// Load persisted completion sets; absent or corrupt state starts
    /// empty.
    pub fn load(store: Arc<dyn PersistentStore>, node_reward: i64) -> Result<Self, EngineError> {
        let sets: FxHashMap<String, FxHashSet<String>> =
            codec::load_or_default(store.as_ref(), keys::COMPLETION_SETS)?;
        Ok(Self {
            sets,
            node_reward,
            store,
        })
    }

    /// Mark a node completed. Returns `true` only the first time a
    /// given `(roadmap, node)` pair is seen; duplicates are no-ops
    /// returning `false` with no XP side effect.
    ///
    /// On a first completion the updated set is persisted *before* the
    /// XP award, so a retry after any failure can never double-award:
    /// membership is re-checked from durable state.
    pub fn mark_completed(
        &mut self,
        roadmap_id: &str,
        node_id: &str,
        ledger: &mut ProgressionLedger,
        now: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        if self.is_completed(roadmap_id, node_id) {
            return Ok(false);
        }

        self.sets
            .entry(roadmap_id.to_string())
            .or_default()
            .insert(node_id.to_string());
        self.persist()?;

        ledger.add_xp(self.node_reward, &format!("node:{node_id}"), now)?;
        tracing::debug!(roadmap_id, node_id, "node completed");
        Ok(true)
    }

    pub fn is_completed(&self, roadmap_id: &str, node_id: &str) -> bool {
        self.sets
            .get(roadmap_id)
            .map(|nodes| nodes.contains(node_id))
            .unwrap_or(false)
    }

    /// Snapshot of the completed node ids for a roadmap. Mutating the
    /// returned set cannot affect tracker state.
    pub fn completed_ids(&self, roadmap_id: &str) -> FxHashSet<String> {
        self.sets.get(roadmap_id).cloned().unwrap_or_default()
    }

    /// Completion percentage as `round(100 * completed / total_nodes)`,
    /// clamped to `[0, 100]`. A zero node count yields 0 instead of a
    /// division error.
    pub fn completion_percentage(&self, roadmap_id: &str, total_nodes: u32) -> u8 {
        if total_nodes == 0 {
            return 0;
        }
        let completed = self.sets.get(roadmap_id).map(|n| n.len()).unwrap_or(0);
        let pct = (100.0 * completed as f64 / total_nodes as f64).round();
        pct.min(100.0) as u8
    }

    fn persist(&self) -> Result<(), StorageError> {
        codec::save(self.store.as_ref(), keys::COMPLETION_SETS, &self.sets)
    }
}
