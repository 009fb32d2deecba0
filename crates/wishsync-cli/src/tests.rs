use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;
use wishsync_core::db::{CheckpointStore, Database, LibSqlCheckpointStore};
use wishsync_core::{SyncCheckpoint, SyncSummary};

use crate::cli::{Cli, Commands};
use crate::commands::common::{
    format_relative_time, format_status_lines, format_sync_timestamp, list_wishlists, load_status,
    resolve_db_path_from, status_report,
};
use crate::commands::list::run_list;
use crate::commands::sync::format_summary_lines;
use crate::error::CliError;

#[test]
fn sync_is_the_default_command() {
    let cli = Cli::try_parse_from(["wishsync"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.db_path.is_none());

    let cli = Cli::try_parse_from(["wishsync", "sync", "--json"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Sync { json: true })));
}

#[test]
fn db_path_is_global() {
    let cli = Cli::try_parse_from(["wishsync", "list", "--db-path", "/tmp/w.db", "-l", "5"]).unwrap();
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/w.db")));
    assert!(matches!(
        cli.command,
        Some(Commands::List {
            limit: 5,
            json: false
        })
    ));
}

#[test]
fn list_limit_defaults_to_fifty() {
    let cli = Cli::try_parse_from(["wishsync", "list"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::List { limit: 50, .. })));
}

#[test]
fn resolve_db_path_prefers_flag_then_env() {
    assert_eq!(
        resolve_db_path_from(
            Some(PathBuf::from("flag.db")),
            Some(PathBuf::from("env.db"))
        ),
        PathBuf::from("flag.db")
    );
    assert_eq!(
        resolve_db_path_from(None, Some(PathBuf::from("env.db"))),
        PathBuf::from("env.db")
    );

    let fallback = resolve_db_path_from(None, Some(PathBuf::new()));
    assert!(fallback.ends_with("wishsync/wishsync.db"));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn format_sync_timestamp_renders_utc() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn status_lines_describe_checkpoint_state() {
    let lines = format_status_lines(&status_report(None, 0, 0));
    assert_eq!(lines[0], "Checkpoint: never synced");

    let in_progress = SyncCheckpoint {
        value: "abc".to_string(),
        updated_at: 0,
    };
    let report = status_report(Some(&in_progress), 3, 1);
    assert!(report.cycle_in_progress);
    assert_eq!(
        format_status_lines(&report),
        vec![
            "Checkpoint: resuming at abc (updated 1970-01-01 00:00:00 UTC)".to_string(),
            "Wishlists:  3".to_string(),
            "Items:      1".to_string(),
        ]
    );

    let complete = SyncCheckpoint {
        value: String::new(),
        updated_at: 0,
    };
    let report = status_report(Some(&complete), 3, 1);
    assert!(!report.cycle_in_progress);
    assert!(format_status_lines(&report)[0].starts_with("Checkpoint: cycle complete"));
}

#[test]
fn summary_lines_mention_skips_only_when_present() {
    let summary = SyncSummary {
        wishlists_persisted: 3,
        items_persisted: 1,
        pages_fetched: 2,
        ..SyncSummary::default()
    };
    assert_eq!(
        format_summary_lines(&summary),
        vec!["Synced 3 wishlists and 1 items across 2 pages".to_string()]
    );

    let summary = SyncSummary {
        wishlists_skipped: 1,
        ..summary
    };
    assert_eq!(format_summary_lines(&summary).len(), 2);
}

#[test]
fn summary_json_uses_camel_case() {
    let summary = SyncSummary {
        wishlists_persisted: 3,
        items_persisted: 1,
        ..SyncSummary::default()
    };
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["wishlistsPersisted"], 3);
    assert_eq!(value["itemsPersisted"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn status_reads_checkpoint_from_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("wishsync.db");

    {
        let db = Database::open(&db_path).await.unwrap();
        LibSqlCheckpointStore::new(db.connection())
            .write("abc", 1_000)
            .await
            .unwrap();
    }

    let report = load_status(&db_path).await.unwrap();
    assert_eq!(report.checkpoint.as_deref(), Some("abc"));
    assert_eq!(report.checkpoint_updated_at, Some(1_000));
    assert_eq!(report.wishlists, 0);
    assert!(list_wishlists(10, &db_path).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_rejects_zero_limit() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("wishsync.db");

    let error = run_list(0, false, &db_path).await.unwrap_err();
    assert!(matches!(error, CliError::InvalidLimit));
}
