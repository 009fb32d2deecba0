//! Sync checkpoint model

use serde::{Deserialize, Serialize};

/// Key of the single checkpoint row in `sync_state`.
pub const CHECKPOINT_KEY: &str = "last_cursor";

/// Durable resume position of the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCheckpoint {
    /// Cursor or page marker; empty means the next run starts a fresh cycle
    pub value: String,
    /// Last write timestamp (Unix ms)
    pub updated_at: i64,
}

impl SyncCheckpoint {
    /// Whether the last run stopped part-way through a cycle.
    #[must_use]
    pub fn is_cycle_in_progress(&self) -> bool {
        !self.value.is_empty()
    }
}
