//! Storage backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the SQLite store lives. `None` means the caller chooses
/// (typically `.stride/stride.db` next to the host application, or an
/// in-memory store in tests).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}
