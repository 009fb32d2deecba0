//! Wishlist repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use crate::error::Result;
use crate::models::{PersistedItemRow, PersistedWishlistRow, RemoteItem, RemoteWishlist};
use crate::sync::SinkError;
use crate::util::unix_millis_now;
use libsql::{Connection, Row, Value};

/// Idempotent writes of remote records (async)
///
/// Failures are returned, never panicked; the caller decides whether to continue.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    /// Insert or fully replace the wishlist keyed by its remote id
    async fn upsert_wishlist(&self, wishlist: &RemoteWishlist)
        -> std::result::Result<(), SinkError>;

    /// Insert or replace the item keyed by (wishlist, product, variant)
    async fn upsert_item(
        &self,
        wishlist_id: &str,
        item: &RemoteItem,
    ) -> std::result::Result<(), SinkError>;
}

/// libSQL implementation of `RecordSink` plus the read side used for status output
pub struct LibSqlWishlistRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlWishlistRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get a wishlist by remote id
    pub async fn get(&self, id: &str) -> Result<Option<PersistedWishlistRow>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, owner_customer_id, owner_email, public_url, raw, first_seen_at, last_synced_at
                 FROM wishlists WHERE id = ?",
                [id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_wishlist(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Most recently synced wishlists first
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<PersistedWishlistRow>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, owner_customer_id, owner_email, public_url, raw, first_seen_at, last_synced_at
                 FROM wishlists
                 ORDER BY last_synced_at DESC, id ASC
                 LIMIT ?",
                [limit as i64],
            )
            .await?;

        let mut wishlists = Vec::new();
        while let Some(row) = rows.next().await? {
            wishlists.push(Self::parse_wishlist(&row)?);
        }
        Ok(wishlists)
    }

    /// Like `list_recent`, paired with each wishlist's stored item count
    pub async fn list_recent_with_item_counts(
        &self,
        limit: usize,
    ) -> Result<Vec<(PersistedWishlistRow, usize)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT w.id, w.owner_customer_id, w.owner_email, w.public_url, w.raw,
                        w.first_seen_at, w.last_synced_at, COALESCE(i.item_count, 0)
                 FROM wishlists w
                 LEFT JOIN (
                     SELECT wishlist_id, COUNT(*) AS item_count
                     FROM wishlist_items
                     GROUP BY wishlist_id
                 ) i ON i.wishlist_id = w.id
                 ORDER BY w.last_synced_at DESC, w.id ASC
                 LIMIT ?",
                [limit as i64],
            )
            .await?;

        let mut wishlists = Vec::new();
        while let Some(row) = rows.next().await? {
            let item_count = usize::try_from(row.get::<i64>(7)?).unwrap_or(0);
            wishlists.push((Self::parse_wishlist(&row)?, item_count));
        }
        Ok(wishlists)
    }

    /// Items stored for a wishlist
    pub async fn list_items(&self, wishlist_id: &str) -> Result<Vec<PersistedItemRow>> {
        let mut rows = self
            .conn
            .query(
                "SELECT wishlist_id, product_id, variant_id, quantity, raw, last_synced_at
                 FROM wishlist_items
                 WHERE wishlist_id = ?
                 ORDER BY product_id, variant_id",
                [wishlist_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(PersistedItemRow {
                wishlist_id: row.get(0)?,
                product_id: row.get(1)?,
                variant_id: row.get(2)?,
                quantity: u32::try_from(row.get::<i64>(3)?).unwrap_or(0),
                raw: row.get(4)?,
                last_synced_at: row.get(5)?,
            });
        }
        Ok(items)
    }

    /// Number of stored wishlists
    pub async fn count(&self) -> Result<u64> {
        self.count_rows("SELECT COUNT(*) FROM wishlists").await
    }

    /// Number of stored items across all wishlists
    pub async fn count_items(&self) -> Result<u64> {
        self.count_rows("SELECT COUNT(*) FROM wishlist_items").await
    }

    async fn count_rows(&self, sql: &str) -> Result<u64> {
        let mut rows = self.conn.query(sql, ()).await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Parse a wishlist from a database row
    fn parse_wishlist(row: &Row) -> Result<PersistedWishlistRow> {
        Ok(PersistedWishlistRow {
            id: row.get(0)?,
            owner_customer_id: optional_text(row, 1)?,
            owner_email: optional_text(row, 2)?,
            public_url: optional_text(row, 3)?,
            raw: row.get(4)?,
            first_seen_at: row.get(5)?,
            last_synced_at: row.get(6)?,
        })
    }
}

impl RecordSink for LibSqlWishlistRepository<'_> {
    async fn upsert_wishlist(
        &self,
        wishlist: &RemoteWishlist,
    ) -> std::result::Result<(), SinkError> {
        if wishlist.id.trim().is_empty() {
            return Err(SinkError::MissingIdentifier);
        }

        let now = unix_millis_now();
        let raw = serde_json::to_string(&wishlist.raw).map_err(crate::Error::from)?;

        // first_seen_at is kept from the original insert; everything else is replaced
        self.conn
            .execute(
                "INSERT INTO wishlists (
                    id, owner_customer_id, owner_email, public_url, raw, first_seen_at, last_synced_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    owner_customer_id = excluded.owner_customer_id,
                    owner_email = excluded.owner_email,
                    public_url = excluded.public_url,
                    raw = excluded.raw,
                    last_synced_at = excluded.last_synced_at",
                vec![
                    Value::Text(wishlist.id.clone()),
                    text_or_null(wishlist.customer_id.as_deref()),
                    text_or_null(wishlist.email.as_deref()),
                    text_or_null(wishlist.public_url.as_deref()),
                    Value::Text(raw),
                    Value::Integer(now),
                    Value::Integer(now),
                ],
            )
            .await?;
        Ok(())
    }

    async fn upsert_item(
        &self,
        wishlist_id: &str,
        item: &RemoteItem,
    ) -> std::result::Result<(), SinkError> {
        if wishlist_id.trim().is_empty() {
            return Err(SinkError::MissingIdentifier);
        }

        let raw = serde_json::to_string(&item.raw).map_err(crate::Error::from)?;

        self.conn
            .execute(
                "INSERT INTO wishlist_items (
                    wishlist_id, product_id, variant_id, quantity, raw, last_synced_at
                 ) VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(wishlist_id, product_id, variant_id) DO UPDATE SET
                    quantity = excluded.quantity,
                    raw = excluded.raw,
                    last_synced_at = excluded.last_synced_at",
                vec![
                    Value::Text(wishlist_id.to_string()),
                    Value::Text(item.product_id.clone().unwrap_or_default()),
                    Value::Text(item.variant_id.clone().unwrap_or_default()),
                    Value::Integer(i64::from(item.quantity)),
                    Value::Text(raw),
                    Value::Integer(unix_millis_now()),
                ],
            )
            .await?;
        Ok(())
    }
}

fn text_or_null(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn optional_text(row: &Row, index: i32) -> Result<Option<String>> {
    match row.get_value(index)? {
        Value::Text(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}
