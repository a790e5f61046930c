//! Schema migrations, guarded by `PRAGMA user_version`.

use rusqlite::Connection;
use stride_core::errors::StorageError;

/// V001: the learner state table. One row per logical key, full
/// payload replaced on every write.
pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS learner_state (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_learner_state_updated
    ON learner_state(updated_at);
"#;

const SCHEMA_VERSION: i64 = 1;

/// Run any outstanding migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;

    if version < SCHEMA_VERSION {
        conn.execute_batch(MIGRATION_SQL)
            .map_err(|e| StorageError::Sqlite {
                message: format!("migration failed: {e}"),
            })?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
    }
    Ok(())
}
