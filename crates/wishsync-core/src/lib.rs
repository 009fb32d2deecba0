//! wishsync-core - Core library for wishsync
//!
//! This crate contains the record models, the libSQL store, and the
//! incremental sync engine that replicates remote wishlists into it.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sync;
pub mod util;

pub use config::SyncSettings;
pub use error::{Error, Result};
pub use models::{RemoteItem, RemoteWishlist, SyncCheckpoint};
pub use sync::{run_sync, SyncFailure, SyncSummary};
