//! EventDispatcher — synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::LearnerEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec,
/// effectively zero cost.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn LearnerEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn LearnerEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are isolated and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn LearnerEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::error!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    pub fn emit_xp_awarded(&self, event: &XpAwardedEvent) {
        self.emit(|h| h.on_xp_awarded(event));
    }

    pub fn emit_level_up(&self, event: &LevelUpEvent) {
        self.emit(|h| h.on_level_up(event));
    }

    pub fn emit_node_completed(&self, event: &NodeCompletedEvent) {
        self.emit(|h| h.on_node_completed(event));
    }

    pub fn emit_streak_changed(&self, event: &StreakChangedEvent) {
        self.emit(|h| h.on_streak_changed(event));
    }

    pub fn emit_achievement_unlocked(&self, event: &AchievementUnlockedEvent) {
        self.emit(|h| h.on_achievement_unlocked(event));
    }

    pub fn emit_progression_reset(&self, event: &ProgressionResetEvent) {
        self.emit(|h| h.on_progression_reset(event));
    }
}
