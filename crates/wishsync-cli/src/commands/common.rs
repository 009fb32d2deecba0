use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use wishsync_core::config::ENV_DB_PATH;
use wishsync_core::db::{Database, LibSqlCheckpointStore, LibSqlWishlistRepository};
use wishsync_core::models::PersistedWishlistRow;
use wishsync_core::SyncCheckpoint;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct WishlistListItem {
    pub id: String,
    pub owner_customer_id: Option<String>,
    pub owner_email: Option<String>,
    pub public_url: Option<String>,
    pub item_count: usize,
    pub first_seen_at: i64,
    pub last_synced_at: i64,
    pub last_synced_iso: String,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub checkpoint: Option<String>,
    pub checkpoint_updated_at: Option<i64>,
    pub cycle_in_progress: bool,
    pub wishlists: u64,
    pub items: u64,
}

pub async fn list_wishlists(
    limit: usize,
    db_path: &Path,
) -> Result<Vec<(PersistedWishlistRow, usize)>, CliError> {
    let db = open_database(db_path).await?;
    let repo = LibSqlWishlistRepository::new(db.connection());
    Ok(repo.list_recent_with_item_counts(limit).await?)
}

pub async fn load_status(db_path: &Path) -> Result<StatusReport, CliError> {
    let db = open_database(db_path).await?;
    let checkpoint = LibSqlCheckpointStore::new(db.connection()).load().await?;
    let repo = LibSqlWishlistRepository::new(db.connection());

    Ok(status_report(
        checkpoint.as_ref(),
        repo.count().await?,
        repo.count_items().await?,
    ))
}

pub fn status_report(checkpoint: Option<&SyncCheckpoint>, wishlists: u64, items: u64) -> StatusReport {
    StatusReport {
        checkpoint: checkpoint.map(|checkpoint| checkpoint.value.clone()),
        checkpoint_updated_at: checkpoint.map(|checkpoint| checkpoint.updated_at),
        cycle_in_progress: checkpoint.is_some_and(SyncCheckpoint::is_cycle_in_progress),
        wishlists,
        items,
    }
}

pub fn format_status_lines(report: &StatusReport) -> Vec<String> {
    let checkpoint = match (&report.checkpoint, report.checkpoint_updated_at) {
        (Some(_), Some(updated_at)) if !report.cycle_in_progress => {
            format!("cycle complete (updated {})", format_sync_timestamp(updated_at))
        }
        (Some(marker), Some(updated_at)) => format!(
            "resuming at {marker} (updated {})",
            format_sync_timestamp(updated_at)
        ),
        _ => "never synced".to_string(),
    };

    vec![
        format!("Checkpoint: {checkpoint}"),
        format!("Wishlists:  {}", report.wishlists),
        format!("Items:      {}", report.items),
    ]
}

pub fn wishlist_to_list_item(wishlist: &PersistedWishlistRow, item_count: usize) -> WishlistListItem {
    let now_ms = Utc::now().timestamp_millis();

    WishlistListItem {
        id: wishlist.id.clone(),
        owner_customer_id: wishlist.owner_customer_id.clone(),
        owner_email: wishlist.owner_email.clone(),
        public_url: wishlist.public_url.clone(),
        item_count,
        first_seen_at: wishlist.first_seen_at,
        last_synced_at: wishlist.last_synced_at,
        last_synced_iso: format_sync_timestamp(wishlist.last_synced_at),
        relative_time: format_relative_time(wishlist.last_synced_at, now_ms),
    }
}

pub fn format_wishlist_lines(wishlists: &[(PersistedWishlistRow, usize)]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    wishlists
        .iter()
        .map(|(wishlist, item_count)| {
            let owner = wishlist
                .owner_email
                .as_deref()
                .or(wishlist.owner_customer_id.as_deref())
                .unwrap_or("-");
            let relative_time = format_relative_time(wishlist.last_synced_at, now_ms);
            format!(
                "{:<16}  {owner:<32}  {item_count:>4} items  {relative_time}",
                wishlist.id
            )
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else {
        format!("{}d ago", diff / day)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    resolve_db_path_from(cli_db_path, env::var_os(ENV_DB_PATH).map(PathBuf::from))
}

pub fn resolve_db_path_from(cli_db_path: Option<PathBuf>, env_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env_db_path.filter(|path| !path.as_os_str().is_empty()))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wishsync")
        .join("wishsync.db")
}

pub async fn open_database(path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(path).await?)
}
