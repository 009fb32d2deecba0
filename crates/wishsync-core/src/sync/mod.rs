//! Incremental remote-to-local wishlist sync
//!
//! A run detects how the remote API paginates, then walks its pages from the
//! stored checkpoint, upserting every wishlist and item into the local store
//! and advancing the checkpoint after each page. Reaching the last page
//! resets the checkpoint so the next run starts a fresh cycle.

mod backoff;
mod contract;
mod detect;
mod driver;
mod error;
mod http;

#[cfg(test)]
mod testing;

pub use backoff::{delay, BackoffPolicy};
pub use contract::{ApiContract, PaginationStyle, TokenLocation};
pub use detect::detect_contract;
pub use driver::{SyncDriver, SyncOptions, SyncSummary};
pub use error::{CheckpointError, SinkError, SyncError, SyncFailure};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient, TransportError, ACCESS_TOKEN_HEADER};

use crate::config::SyncSettings;
use crate::db::{Database, LibSqlCheckpointStore, LibSqlWishlistRepository};

/// Run one sync against the configured remote store, persisting into `db`.
pub async fn run_sync(settings: &SyncSettings, db: &Database) -> Result<SyncSummary, SyncFailure> {
    run_sync_with_options(settings, db, SyncOptions::default()).await
}

/// Like [`run_sync`], with explicit engine constants.
pub async fn run_sync_with_options(
    settings: &SyncSettings,
    db: &Database,
    options: SyncOptions,
) -> Result<SyncSummary, SyncFailure> {
    let client = ReqwestHttpClient::new(options.request_timeout).map_err(|error| {
        SyncFailure::new(SyncError::HttpClient(error.0), SyncSummary::default())
    })?;
    let sink = LibSqlWishlistRepository::new(db.connection());
    let checkpoints = LibSqlCheckpointStore::new(db.connection());

    SyncDriver::new(
        &client,
        &sink,
        &checkpoints,
        settings.endpoint_root(),
        settings.access_token.clone(),
    )
    .with_options(options)
    .run()
    .await
}
