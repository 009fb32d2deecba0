//! Checkpoint repository implementation

use crate::error::Result;
use crate::models::{SyncCheckpoint, CHECKPOINT_KEY};
use crate::sync::CheckpointError;
use libsql::{Connection, Value};

/// Durable single-value resume marker (async)
#[allow(async_fn_in_trait)]
pub trait CheckpointStore {
    /// Last stored marker, or an empty string before the first write
    async fn read(&self) -> std::result::Result<String, CheckpointError>;

    /// Overwrite the marker; writing the same value twice is harmless
    async fn write(&self, marker: &str, updated_at: i64)
        -> std::result::Result<(), CheckpointError>;
}

/// libSQL implementation of `CheckpointStore`, backed by `sync_state`
pub struct LibSqlCheckpointStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlCheckpointStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load the full checkpoint row, if it was ever written
    pub async fn load(&self) -> Result<Option<SyncCheckpoint>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value, updated_at FROM sync_state WHERE key = ?",
                [CHECKPOINT_KEY],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(SyncCheckpoint {
                value: row.get(0)?,
                updated_at: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }
}

impl CheckpointStore for LibSqlCheckpointStore<'_> {
    async fn read(&self) -> std::result::Result<String, CheckpointError> {
        let checkpoint = self.load().await?;
        Ok(checkpoint.map(|checkpoint| checkpoint.value).unwrap_or_default())
    }

    async fn write(
        &self,
        marker: &str,
        updated_at: i64,
    ) -> std::result::Result<(), CheckpointError> {
        self.conn
            .execute(
                "INSERT INTO sync_state (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                vec![
                    Value::Text(CHECKPOINT_KEY.to_string()),
                    Value::Text(marker.to_string()),
                    Value::Integer(updated_at),
                ],
            )
            .await?;
        Ok(())
    }
}
