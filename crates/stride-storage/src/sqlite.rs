//! SQLite-backed store — write-through, atomic replace per key.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};
use stride_core::errors::StorageError;

use crate::migrations::run_migrations;
use crate::store::PersistentStore;

/// A `PersistentStore` over a single SQLite database.
///
/// One writer connection behind a `Mutex`; every `set` replaces the
/// full payload for its key inside a BEGIN IMMEDIATE transaction, so a
/// crash mid-write can never leave partially-applied state.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Sqlite {
            message: "store lock poisoned".to_string(),
        })
    }
}

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing
/// SQLITE_BUSY surprises mid-write.
fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::Sqlite {
            message: format!("failed to begin transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::Sqlite {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}

impl PersistentStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached("SELECT value FROM learner_state WHERE key = ?1")
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;

        match stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Sqlite {
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let conn = self.lock()?;
        with_immediate_transaction(&conn, |tx| {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO learner_state (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                )
                .map_err(|e| StorageError::WriteFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;

            stmt.execute(params![key, value, Utc::now().timestamp()])
                .map_err(|e| StorageError::WriteFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM learner_state WHERE key = ?1", params![key])
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
