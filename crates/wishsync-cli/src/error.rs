use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] wishsync_core::Error),
    #[error(transparent)]
    Sync(#[from] wishsync_core::SyncFailure),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("List limit must be greater than zero")]
    InvalidLimit,
    #[error(
        "Sync is not configured. Set GIFT_REGGIE_STORE_ID and GIFT_REGGIE_TOKEN to enable `wishsync sync`. ({0})"
    )]
    SyncNotConfigured(String),
}
