//! Data models for wishsync

mod checkpoint;
mod wishlist;

pub use checkpoint::{SyncCheckpoint, CHECKPOINT_KEY};
pub use wishlist::{PersistedItemRow, PersistedWishlistRow, RecordError, RemoteItem, RemoteWishlist};
