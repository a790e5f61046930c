//! JSON payload helpers with corrupt-state fallback.

use serde::de::DeserializeOwned;
use serde::Serialize;

use stride_core::errors::StorageError;

use crate::store::PersistentStore;

/// Load and decode the payload under `key`.
///
/// An absent key yields `T::default()`. A corrupt payload is discarded:
/// the incident is logged and defaults are returned, never an error.
/// Only genuine store read failures propagate.
pub fn load_or_default<T>(store: &dyn PersistentStore, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        None => Ok(T::default()),
        Some(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt payload, using defaults");
                Ok(T::default())
            }
        },
    }
}

/// Encode `value` and write it through under `key`.
pub fn save<T: Serialize>(
    store: &dyn PersistentStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &bytes)?;
    tracing::debug!(key, bytes = bytes.len(), "persisted payload");
    Ok(())
}
