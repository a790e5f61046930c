//! Progression event channel.
//!
//! The engine performs no implicit recomputation on mutation; hosts
//! that want push updates register handlers here instead.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::LearnerEventHandler;
pub use types::*;
