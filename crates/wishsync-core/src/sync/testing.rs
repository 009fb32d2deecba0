//! In-memory fakes for the sync engine's collaborators.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io;
use std::sync::Mutex;

use serde_json::Value;

use super::http::{HttpClient, HttpResponse, TransportError};
use super::{CheckpointError, SinkError};
use crate::db::{CheckpointStore, RecordSink};
use crate::models::{RemoteItem, RemoteWishlist, SyncCheckpoint};

type Scripted = Result<HttpResponse, TransportError>;

/// HTTP client answering from per-URL queues.
///
/// The last queued answer for a URL repeats forever; unscripted URLs get 404.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(status: u16, body: &Value) -> HttpResponse {
        HttpResponse::new(status, body.to_string())
    }

    pub fn status(status: u16) -> HttpResponse {
        HttpResponse::new(status, "")
    }

    pub fn respond(&self, url: impl Into<String>, response: HttpResponse) {
        self.push(url.into(), Ok(response));
    }

    pub fn fail(&self, url: impl Into<String>, message: &str) {
        self.push(url.into(), Err(TransportError(message.to_string())));
    }

    fn push(&self, url: String, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(url)
            .or_default()
            .push_back(answer);
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn requested_headers(&self) -> Vec<Vec<(String, String)>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, headers)| headers.clone())
            .collect()
    }

    pub fn count_requests(&self, url: &str) -> usize {
        self.requested_urls()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            headers
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
        ));

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(url) else {
            return Ok(Self::status(404));
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Ok(Self::status(404)))
        } else {
            queue.front().cloned().unwrap_or_else(|| Ok(Self::status(404)))
        }
    }
}

/// Checkpoint store keeping every write.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    current: Mutex<Option<SyncCheckpoint>>,
    writes: Mutex<Vec<String>>,
    fail_after_writes: Mutex<Option<usize>>,
}

impl MemoryCheckpointStore {
    pub fn with_marker(marker: &str) -> Self {
        let store = Self::default();
        *store.current.lock().unwrap() = Some(SyncCheckpoint {
            value: marker.to_string(),
            updated_at: 0,
        });
        store
    }

    /// Accept `count` more writes, then fail every following one.
    pub fn fail_after(&self, count: usize) {
        *self.fail_after_writes.lock().unwrap() = Some(count);
    }

    pub fn marker(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|checkpoint| checkpoint.value.clone())
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    async fn read(&self) -> Result<String, CheckpointError> {
        Ok(self.marker().unwrap_or_default())
    }

    async fn write(&self, marker: &str, updated_at: i64) -> Result<(), CheckpointError> {
        let mut remaining = self.fail_after_writes.lock().unwrap();
        if let Some(count) = remaining.as_mut() {
            if *count == 0 {
                return Err(CheckpointError::Store(crate::Error::Io(io::Error::other("disk full"))));
            }
            *count -= 1;
        }

        self.writes.lock().unwrap().push(marker.to_string());
        *self.current.lock().unwrap() = Some(SyncCheckpoint {
            value: marker.to_string(),
            updated_at,
        });
        Ok(())
    }
}

/// Record sink keyed like the real tables.
#[derive(Default)]
pub struct MemorySink {
    pub wishlists: Mutex<BTreeMap<String, RemoteWishlist>>,
    pub items: Mutex<BTreeMap<(String, String, String), RemoteItem>>,
    failing_wishlists: Mutex<HashSet<String>>,
    failing_products: Mutex<HashSet<String>>,
}

impl MemorySink {
    pub fn fail_wishlist(&self, id: &str) {
        self.failing_wishlists.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_product(&self, product_id: &str) {
        self.failing_products
            .lock()
            .unwrap()
            .insert(product_id.to_string());
    }

    pub fn wishlist_ids(&self) -> Vec<String> {
        self.wishlists.lock().unwrap().keys().cloned().collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

impl RecordSink for MemorySink {
    async fn upsert_wishlist(&self, wishlist: &RemoteWishlist) -> Result<(), SinkError> {
        if self.failing_wishlists.lock().unwrap().contains(&wishlist.id) {
            return Err(SinkError::Store(crate::Error::Io(io::Error::other("constraint failed"))));
        }
        self.wishlists
            .lock()
            .unwrap()
            .insert(wishlist.id.clone(), wishlist.clone());
        Ok(())
    }

    async fn upsert_item(&self, wishlist_id: &str, item: &RemoteItem) -> Result<(), SinkError> {
        let product_id = item.product_id.clone().unwrap_or_default();
        if self.failing_products.lock().unwrap().contains(&product_id) {
            return Err(SinkError::Store(crate::Error::Io(io::Error::other("constraint failed"))));
        }
        let key = (
            wishlist_id.to_string(),
            product_id,
            item.variant_id.clone().unwrap_or_default(),
        );
        self.items.lock().unwrap().insert(key, item.clone());
        Ok(())
    }
}
