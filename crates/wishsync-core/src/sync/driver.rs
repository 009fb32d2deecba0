//! The sync driver: one end-to-end replication run.
//!
//! A run first detects the API contract and reads the checkpoint, then walks
//! the remote pages as an explicit state machine over [`Phase`]:
//!
//! ```text
//! (detect) -> Fetching -> Persisting -> AdvancingCheckpoint -> Fetching ...
//!               |  ^                          |
//!               v  |                          v
//!             Retrying                    Completing
//! ```
//!
//! A detection failure ends the run before any page is fetched. Inside the
//! loop every error moves the machine to `Failed`, which ends the run.
//! Records of a page are always persisted before the checkpoint moves past
//! that page, so the stored marker only ever points at a page that has not
//! been fully persisted yet.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::backoff::BackoffPolicy;
use super::contract::ApiContract;
use super::detect::detect_contract;
use super::http::{HttpClient, ACCESS_TOKEN_HEADER};
use super::{SyncError, SyncFailure};
use crate::db::{CheckpointStore, RecordSink};
use crate::models::RemoteWishlist;
use crate::util::{compact_text, unix_millis_now};

/// Engine constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Records requested per page
    pub page_size: u32,
    /// Records requested per detection probe
    pub probe_page_size: u32,
    /// Fetch attempts per page before giving up
    pub max_attempts: u32,
    /// Minimum gap between consecutive page fetches
    pub page_spacing: Duration,
    pub backoff: BackoffPolicy,
    /// Per-request timeout for the HTTP client
    pub request_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: 250,
            probe_page_size: 1,
            max_attempts: 5,
            page_spacing: Duration::from_secs(1),
            backoff: BackoffPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Counts reported at the end of a run, or alongside the error of a failed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub wishlists_persisted: u64,
    pub items_persisted: u64,
    /// Wishlists that failed to decode or persist
    pub wishlists_skipped: u64,
    /// Items that failed to persist
    pub items_skipped: u64,
    pub pages_fetched: u64,
    pub contract: Option<ApiContract>,
}

/// Why the last fetch attempt of a page failed in a retryable way.
#[derive(Debug)]
struct FetchFailure {
    status: Option<u16>,
    retry_after: Option<u64>,
    message: String,
}

#[derive(Debug)]
enum Phase {
    Fetching {
        marker: String,
        attempt: u32,
    },
    Retrying {
        marker: String,
        attempt: u32,
        failure: FetchFailure,
    },
    Persisting {
        page: Value,
    },
    AdvancingCheckpoint {
        page: Value,
    },
    Completing,
    Failed(SyncError),
}

/// Replicates remote wishlists into a [`RecordSink`], resuming from a [`CheckpointStore`].
pub struct SyncDriver<'a, H, S, C> {
    client: &'a H,
    sink: &'a S,
    checkpoints: &'a C,
    endpoint_root: String,
    access_token: String,
    options: SyncOptions,
}

impl<'a, H, S, C> SyncDriver<'a, H, S, C>
where
    H: HttpClient,
    S: RecordSink,
    C: CheckpointStore,
{
    pub fn new(
        client: &'a H,
        sink: &'a S,
        checkpoints: &'a C,
        endpoint_root: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sink,
            checkpoints,
            endpoint_root: endpoint_root.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            options: SyncOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one sync to completion or to the first unrecoverable error.
    pub async fn run(&self) -> Result<SyncSummary, SyncFailure> {
        tracing::info!("Starting wishlist sync from {}", self.endpoint_root);
        let mut summary = SyncSummary::default();

        match self.run_phases(&mut summary).await {
            Ok(()) => {
                tracing::info!(
                    "Sync complete: {} wishlists, {} items ({} pages)",
                    summary.wishlists_persisted,
                    summary.items_persisted,
                    summary.pages_fetched
                );
                Ok(summary)
            }
            Err(error) => {
                tracing::error!("Sync failed: {error}");
                Err(SyncFailure::new(error, summary))
            }
        }
    }

    async fn run_phases(&self, summary: &mut SyncSummary) -> Result<(), SyncError> {
        let contract = detect_contract(
            self.client,
            &self.endpoint_root,
            &self.access_token,
            self.options.probe_page_size,
        )
        .await?;
        summary.contract = Some(contract.clone());

        let marker = self.checkpoints.read().await?;
        if marker.is_empty() {
            tracing::info!("Starting a fresh sync cycle");
        } else {
            tracing::info!("Resuming sync from checkpoint {marker}");
        }

        let mut phase = Phase::Fetching { marker, attempt: 0 };
        loop {
            let step = match phase {
                Phase::Fetching { marker, attempt } => {
                    self.fetch(&contract, marker, attempt, summary).await
                }
                Phase::Retrying {
                    marker,
                    attempt,
                    failure,
                } => self.retry(marker, attempt, failure).await,
                Phase::Persisting { page } => Ok(self.persist(&contract, page, summary).await),
                Phase::AdvancingCheckpoint { page } => self.advance(&contract, &page).await,
                Phase::Completing => return Ok(()),
                Phase::Failed(error) => return Err(error),
            };
            phase = step.unwrap_or_else(Phase::Failed);
        }
    }

    async fn fetch(
        &self,
        contract: &ApiContract,
        marker: String,
        attempt: u32,
        summary: &mut SyncSummary,
    ) -> Result<Phase, SyncError> {
        let url = contract.page_url(&self.endpoint_root, self.options.page_size, &marker);
        tracing::debug!("Fetching: {url}");

        let headers = [(ACCESS_TOKEN_HEADER, self.access_token.as_str())];
        let response = match self.client.get(&url, &headers).await {
            Ok(response) => response,
            Err(error) => {
                return Ok(Phase::Retrying {
                    marker,
                    attempt,
                    failure: FetchFailure {
                        status: None,
                        retry_after: None,
                        message: error.to_string(),
                    },
                });
            }
        };

        if response.is_retryable() {
            return Ok(Phase::Retrying {
                marker,
                attempt,
                failure: FetchFailure {
                    status: Some(response.status),
                    retry_after: response.retry_after,
                    message: compact_text(&response.body),
                },
            });
        }

        if !response.is_success() {
            return Err(SyncError::FatalFetch {
                status: response.status,
                body: compact_text(&response.body),
            });
        }

        let page = response
            .json()
            .map_err(|error| SyncError::InvalidPayload(error.to_string()))?;
        if !page.is_object() {
            return Err(SyncError::InvalidPayload(
                "expected a JSON object".to_string(),
            ));
        }

        summary.pages_fetched += 1;
        Ok(Phase::Persisting { page })
    }

    async fn retry(
        &self,
        marker: String,
        attempt: u32,
        failure: FetchFailure,
    ) -> Result<Phase, SyncError> {
        let attempts = attempt + 1;
        if attempts >= self.options.max_attempts {
            return Err(SyncError::TransientFetch {
                attempts,
                status: failure.status,
                message: failure.message,
            });
        }

        let delay = self.options.backoff.delay(attempt, failure.retry_after);
        match failure.status {
            Some(status) => tracing::warn!(
                "Rate limited or server error (HTTP {status}), retrying after {delay:?} (attempt {attempts}/{})",
                self.options.max_attempts
            ),
            None => tracing::warn!(
                "Request failed ({}), retrying after {delay:?} (attempt {attempts}/{})",
                failure.message,
                self.options.max_attempts
            ),
        }
        tokio::time::sleep(delay).await;

        Ok(Phase::Fetching {
            marker,
            attempt: attempts,
        })
    }

    async fn persist(
        &self,
        contract: &ApiContract,
        mut page: Value,
        summary: &mut SyncSummary,
    ) -> Phase {
        let records = contract.take_records(&mut page);
        tracing::info!("Fetched {} wishlists", records.len());

        for record in records {
            self.persist_wishlist(record, summary).await;
        }

        Phase::AdvancingCheckpoint { page }
    }

    /// Sink failures are logged and skipped; they never abort the run.
    async fn persist_wishlist(&self, record: Value, summary: &mut SyncSummary) {
        let wishlist = match RemoteWishlist::from_value(record) {
            Ok(wishlist) => wishlist,
            Err(error) => {
                tracing::warn!("Skipping wishlist record: {error}");
                summary.wishlists_skipped += 1;
                return;
            }
        };

        if let Err(error) = self.sink.upsert_wishlist(&wishlist).await {
            tracing::warn!("Error upserting wishlist {}: {error}", wishlist.id);
            summary.wishlists_skipped += 1;
            return;
        }
        summary.wishlists_persisted += 1;

        for item in &wishlist.items {
            if !item.is_complete() {
                tracing::warn!(
                    "Incomplete item on wishlist {} (product: {:?}, variant: {:?})",
                    wishlist.id,
                    item.product_id,
                    item.variant_id
                );
            }

            match self.sink.upsert_item(&wishlist.id, item).await {
                Ok(()) => summary.items_persisted += 1,
                Err(error) => {
                    tracing::warn!("Error upserting item for wishlist {}: {error}", wishlist.id);
                    summary.items_skipped += 1;
                }
            }
        }
    }

    async fn advance(&self, contract: &ApiContract, page: &Value) -> Result<Phase, SyncError> {
        let now = unix_millis_now();

        if let Some(token) = contract.next_page_token(page) {
            self.checkpoints.write(&token, now).await?;
            tracing::debug!("Checkpoint advanced to {token}");
            tokio::time::sleep(self.options.page_spacing).await;
            return Ok(Phase::Fetching {
                marker: token,
                attempt: 0,
            });
        }

        tracing::info!("Reached end of wishlists, resetting cursor");
        self.checkpoints.write("", now).await?;
        Ok(Phase::Completing)
    }
}
