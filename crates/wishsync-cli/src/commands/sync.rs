use std::path::Path;

use wishsync_core::{run_sync as run_core_sync, SyncSettings, SyncSummary};

use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_sync(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let settings =
        SyncSettings::from_env().map_err(|error| CliError::SyncNotConfigured(error.to_string()))?;
    let db = open_database(db_path).await?;

    match run_core_sync(&settings, &db).await {
        Ok(summary) => {
            print_summary(&summary, as_json)?;
            Ok(())
        }
        Err(failure) => {
            // Partial counts still go to stdout for schedulers parsing the output
            if as_json {
                print_summary(&failure.summary, true)?;
            }
            Err(failure.into())
        }
    }
}

fn print_summary(summary: &SyncSummary, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        for line in format_summary_lines(summary) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_summary_lines(summary: &SyncSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Synced {} wishlists and {} items across {} pages",
        summary.wishlists_persisted, summary.items_persisted, summary.pages_fetched
    )];
    if summary.wishlists_skipped > 0 || summary.items_skipped > 0 {
        lines.push(format!(
            "Skipped {} wishlists and {} items",
            summary.wishlists_skipped, summary.items_skipped
        ));
    }
    lines
}
