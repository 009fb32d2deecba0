//! Database layer for wishsync

mod checkpoint_repository;
mod connection;
mod migrations;
mod wishlist_repository;

pub use checkpoint_repository::{CheckpointStore, LibSqlCheckpointStore};
pub use connection::Database;
pub use wishlist_repository::{LibSqlWishlistRepository, RecordSink};
