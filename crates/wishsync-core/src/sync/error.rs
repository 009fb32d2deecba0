//! Error taxonomy of the sync engine.
//!
//! Only [`SyncError`] aborts a run. [`SinkError`] is recovered per record by
//! the driver, and [`CheckpointError`] is escalated into
//! [`SyncError::Checkpoint`].

use thiserror::Error;

use super::SyncSummary;

/// Failure that ends a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    /// No candidate endpoint answered successfully; nothing was fetched.
    #[error("Could not detect wishlists endpoint: {}", .tried.join("; "))]
    Detection { tried: Vec<String> },

    /// 429, 5xx or transport failures outlasted the retry budget.
    #[error("Page fetch failed after {attempts} attempts ({}): {message}", describe_status(.status))]
    TransientFetch {
        attempts: u32,
        status: Option<u16>,
        message: String,
    },

    /// Non-retryable error status.
    #[error("Failed to fetch wishlists: HTTP {status}: {body}")]
    FatalFetch { status: u16, body: String },

    /// A successful response whose body is not usable JSON.
    #[error("Invalid wishlist page payload: {0}")]
    InvalidPayload(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The resume marker could not be read or written.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl SyncError {
    /// Whether the failure came from a retryable condition that ran out of attempts.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetch { .. })
    }
}

fn describe_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "transport error".to_string(), |status| format!("HTTP {status}"))
}

/// Failure to persist a single record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Record has an empty identifier")]
    MissingIdentifier,
    #[error("Store error: {0}")]
    Store(#[from] crate::Error),
}

/// Failure to read or write the resume marker
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint store error: {0}")]
    Store(#[from] crate::Error),
}

impl From<libsql::Error> for SinkError {
    fn from(error: libsql::Error) -> Self {
        Self::Store(error.into())
    }
}

impl From<libsql::Error> for CheckpointError {
    fn from(error: libsql::Error) -> Self {
        Self::Store(error.into())
    }
}

/// An aborted run together with the counts persisted before it stopped
#[derive(Debug, Error)]
#[error(
    "{error} (persisted {} wishlists and {} items before stopping)",
    .summary.wishlists_persisted,
    .summary.items_persisted
)]
pub struct SyncFailure {
    #[source]
    pub error: SyncError,
    pub summary: SyncSummary,
}

impl SyncFailure {
    pub const fn new(error: SyncError, summary: SyncSummary) -> Self {
        Self { error, summary }
    }
}
