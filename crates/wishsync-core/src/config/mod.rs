//! Runtime configuration for the sync engine.
//!
//! Settings are read from the process environment. Everything except the
//! store credentials has a default, so a scheduler only has to provide
//! `GIFT_REGGIE_STORE_ID` and `GIFT_REGGIE_TOKEN`.

use std::collections::HashMap;
use std::env;
use std::fmt;

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_STORE_ID: &str = "GIFT_REGGIE_STORE_ID";
pub const ENV_TOKEN: &str = "GIFT_REGGIE_TOKEN";
pub const ENV_API_URL: &str = "GIFT_REGGIE_API_URL";
pub const ENV_DB_PATH: &str = "WISHSYNC_DB_PATH";

const DEFAULT_API_URL: &str = "https://gift-reggie.eshopadmin.com/api";

/// Credentials and locations needed for one sync invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Remote API root, without trailing slash.
    pub api_url: String,
    /// Remote store identifier appended to `api_url`.
    pub store_id: String,
    /// Fixed access token sent with every request.
    pub access_token: String,
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SyncSettings")
            .field("api_url", &self.api_url)
            .field("store_id", &self.store_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl SyncSettings {
    pub fn new(
        api_url: impl Into<String>,
        store_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let api_url = normalize_api_url(api_url.into())?;
        let store_id = normalize_text_option(Some(store_id.into()))
            .ok_or_else(|| Error::Config(format!("{ENV_STORE_ID} must not be empty")))?;
        let access_token = normalize_text_option(Some(access_token.into()))
            .ok_or_else(|| Error::Config(format!("{ENV_TOKEN} must not be empty")))?;

        Ok(Self {
            api_url,
            store_id,
            access_token,
        })
    }

    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_id = required(&lookup, ENV_STORE_ID)?;
        let access_token = required(&lookup, ENV_TOKEN)?;
        let api_url = normalize_text_option(lookup(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self::new(api_url, store_id, access_token)
    }

    /// Root that candidate endpoint paths are appended to.
    pub fn endpoint_root(&self) -> String {
        format!("{}/{}", self.api_url, self.store_id)
    }
}

fn required(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    normalize_text_option(lookup(name))
        .ok_or_else(|| Error::Config(format!("Missing required environment variable: {name}")))
}

fn normalize_api_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config(format!("{ENV_API_URL} must not be empty")))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(format!(
            "{ENV_API_URL} must start with http:// or https://"
        )))
    }
}
