//! Wishlist and wishlist item models
//!
//! Remote records are decoded leniently from the JSON the API returns. Only
//! the fields the store indexes are modelled; the full object is kept in
//! `raw` so nothing the API adds later is lost.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a remote record could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no `id`")]
    MissingIdentifier,
}

/// A wishlist as returned by the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteWishlist {
    /// Remote-assigned identifier, stable across runs
    pub id: String,
    pub customer_id: Option<String>,
    pub email: Option<String>,
    pub public_url: Option<String>,
    pub items: Vec<RemoteItem>,
    /// Full payload as received
    pub raw: Value,
}

impl RemoteWishlist {
    /// Decode a wishlist from one element of the page's list field.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let id = text_field(object, "id").ok_or(RecordError::MissingIdentifier)?;

        let items = match object.get("items") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| match RemoteItem::from_value(entry.clone()) {
                    Ok(item) => Some(item),
                    Err(error) => {
                        tracing::warn!("Skipping item on wishlist {id}: {error}");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let customer_id = text_field(object, "customer_id");
        let email = text_field(object, "email");
        let public_url = text_field(object, "public_url");

        Ok(Self {
            id,
            customer_id,
            email,
            public_url,
            items,
            raw: value,
        })
    }
}

/// A line item on a remote wishlist
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteItem {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub quantity: u32,
    /// Full payload as received
    pub raw: Value,
}

impl RemoteItem {
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let product_id = text_field(object, "product_id");
        let variant_id = text_field(object, "variant_id");
        let quantity = quantity_field(object.get("quantity"));

        Ok(Self {
            product_id,
            variant_id,
            quantity,
            raw: value,
        })
    }

    /// Items missing either product or variant are still stored, but flagged.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.product_id.is_some() && self.variant_id.is_some()
    }
}

/// Local materialization of a remote wishlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedWishlistRow {
    pub id: String,
    pub owner_customer_id: Option<String>,
    pub owner_email: Option<String>,
    pub public_url: Option<String>,
    /// Raw JSON payload
    pub raw: String,
    /// First insert timestamp (Unix ms)
    pub first_seen_at: i64,
    /// Last upsert timestamp (Unix ms)
    pub last_synced_at: i64,
}

/// Local materialization of a wishlist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedItemRow {
    pub wishlist_id: String,
    /// Empty when the remote item had no product id
    pub product_id: String,
    /// Empty when the remote item had no variant id
    pub variant_id: String,
    pub quantity: u32,
    pub raw: String,
    pub last_synced_at: i64,
}

/// Read a string-ish field; integers are accepted since some ids come back numeric.
///
/// Strings are kept as received. Blank strings count as absent.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Missing quantities are 0; anything present but unusable is 0 with a warning.
fn quantity_field(value: Option<&Value>) -> u32 {
    let parsed = match value {
        None | Some(Value::Null) => return 0,
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(whole_quantity)),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_quantity))
        }
        Some(_) => None,
    };

    parsed.map_or_else(
        || {
            tracing::warn!("Unusable item quantity {value:?}, storing 0");
            0
        },
        |quantity| u32::try_from(quantity).unwrap_or(u32::MAX),
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn whole_quantity(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then(|| value as u64)
}
