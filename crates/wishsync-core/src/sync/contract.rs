//! The remote API's pagination contract and where to find things in a page.
//!
//! The API has shipped several shapes over time, so every lookup walks an
//! explicit, ordered list of candidates and the first match wins.

use serde::Serialize;
use serde_json::Value;

/// Endpoint paths probed in order.
pub const ENDPOINT_CANDIDATES: [&str; 3] = ["wishlists", "wishlists.json", "wishlist"];

/// Top-level fields that may hold the page's record array, in preference order.
pub const LIST_FIELD_CANDIDATES: [&str; 2] = ["wishlists", "data"];

/// Locations of the next-page token, in preference order.
pub const NEXT_PAGE_LOCATIONS: [TokenLocation; 3] = [
    TokenLocation::TopLevel("next_cursor"),
    TokenLocation::Pagination("next_cursor"),
    TokenLocation::Pagination("next"),
];

/// Locations whose presence in a probe means the API pages by cursor.
const CURSOR_LOCATIONS: [TokenLocation; 2] = [
    TokenLocation::TopLevel("next_cursor"),
    TokenLocation::Pagination("next_cursor"),
];

/// How the next page is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationStyle {
    /// Opaque server-issued string
    Cursor,
    /// Numeric page index
    Page,
}

impl PaginationStyle {
    /// Query parameter carrying the marker.
    pub const fn query_param(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Page => "page",
        }
    }
}

/// A named place in a page body where a token may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    /// `body.<field>`
    TopLevel(&'static str),
    /// `body.pagination.<field>`
    Pagination(&'static str),
}

impl TokenLocation {
    fn lookup(self, body: &Value) -> Option<&Value> {
        match self {
            Self::TopLevel(field) => body.get(field),
            Self::Pagination(field) => body.get("pagination")?.get(field),
        }
    }
}

/// Contract inferred once per run by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiContract {
    pub endpoint: String,
    pub style: PaginationStyle,
    pub list_field: String,
}

impl ApiContract {
    /// URL of the page addressed by `marker`; an empty marker means the first page.
    pub fn page_url(&self, endpoint_root: &str, page_size: u32, marker: &str) -> String {
        let mut url = format!("{endpoint_root}/{}?limit={page_size}", self.endpoint);
        if !marker.is_empty() {
            url.push('&');
            url.push_str(self.style.query_param());
            url.push('=');
            url.push_str(&urlencoding::encode(marker));
        }
        url
    }

    /// Move the record array out of a page, leaving the rest of the body intact.
    ///
    /// A missing or non-array list field yields an empty page.
    pub fn take_records(&self, page: &mut Value) -> Vec<Value> {
        match page.get_mut(&self.list_field).map(Value::take) {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        }
    }

    /// Token addressing the page after this one, if any.
    pub fn next_page_token(&self, page: &Value) -> Option<String> {
        NEXT_PAGE_LOCATIONS
            .iter()
            .find_map(|location| location.lookup(page).and_then(token_value))
    }
}

/// First list-field candidate holding an array.
pub fn detect_list_field(body: &Value) -> Option<&'static str> {
    LIST_FIELD_CANDIDATES
        .iter()
        .copied()
        .find(|field| body.get(field).is_some_and(Value::is_array))
}

/// Cursor style when a probe advertises a next cursor, page style otherwise.
pub fn detect_style(body: &Value) -> PaginationStyle {
    let has_cursor = CURSOR_LOCATIONS
        .iter()
        .any(|location| location.lookup(body).and_then(token_value).is_some());
    if has_cursor {
        PaginationStyle::Cursor
    } else {
        PaginationStyle::Page
    }
}

/// Non-blank strings and integers are tokens; everything else counts as absent.
///
/// String tokens are opaque and kept byte-for-byte.
fn token_value(value: &Value) -> Option<String> {
    match value {
        Value::String(token) => (!token.trim().is_empty()).then(|| token.clone()),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}
