//! In-memory store for tests, with a write-failure toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rustc_hash::FxHashMap;
use stride_core::errors::StorageError;

use crate::store::PersistentStore;

/// A `PersistentStore` over a process-local map. Intended for tests;
/// `set_fail_writes(true)` makes every subsequent write fail so callers
/// can exercise persistence-error surfacing.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle forced write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FxHashMap<String, Vec<u8>>>, StorageError> {
        self.entries.lock().map_err(|_| StorageError::Sqlite {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "write failure injected".to_string(),
            });
        }
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
