//! The key/value persistence capability.

use stride_core::errors::StorageError;

/// Key → bytes storage. Implementations must make `set` atomic per key
/// (full replace, never partial) and durable before returning.
///
/// The engine persists three logical keys (see [`crate::keys`]) and
/// tolerates both absent keys and corrupt payloads on read.
pub trait PersistentStore: Send + Sync {
    /// Read a value. Absent keys are `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Atomically replace the value under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}
