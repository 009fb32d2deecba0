//! One-shot pagination strategy detection.

use super::contract::{
    detect_list_field, detect_style, ApiContract, ENDPOINT_CANDIDATES, LIST_FIELD_CANDIDATES,
};
use super::http::{HttpClient, ACCESS_TOKEN_HEADER};
use super::SyncError;
use crate::util::compact_text;

/// Probe the candidate endpoints and infer the contract from the first that answers.
///
/// Makes no writes. Fails only when every candidate fails.
pub async fn detect_contract<H: HttpClient>(
    client: &H,
    endpoint_root: &str,
    access_token: &str,
    probe_page_size: u32,
) -> Result<ApiContract, SyncError> {
    let headers = [(ACCESS_TOKEN_HEADER, access_token)];
    let mut tried = Vec::with_capacity(ENDPOINT_CANDIDATES.len());

    for endpoint in ENDPOINT_CANDIDATES {
        let url = format!("{endpoint_root}/{endpoint}?limit={probe_page_size}");
        tracing::debug!("Probing endpoint: {url}");

        let response = match client.get(&url, &headers).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!("Endpoint {endpoint} not available: {error}");
                tried.push(format!("{endpoint}: {error}"));
                continue;
            }
        };

        if !response.is_success() {
            tracing::debug!("Endpoint {endpoint} returned HTTP {}", response.status);
            tried.push(format!("{endpoint}: HTTP {}", response.status));
            continue;
        }

        let body = match response.json() {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!(
                    "Endpoint {endpoint} returned non-JSON body: {error}: {}",
                    compact_text(&response.body)
                );
                tried.push(format!("{endpoint}: invalid JSON ({error})"));
                continue;
            }
        };

        let list_field = detect_list_field(&body).unwrap_or_else(|| {
            tracing::warn!(
                "Endpoint {endpoint} has no known list field; assuming `{}`",
                LIST_FIELD_CANDIDATES[0]
            );
            LIST_FIELD_CANDIDATES[0]
        });

        let contract = ApiContract {
            endpoint: endpoint.to_string(),
            style: detect_style(&body),
            list_field: list_field.to_string(),
        };
        tracing::info!(
            "Detected endpoint: {}, style: {:?}, key: {}",
            contract.endpoint,
            contract.style,
            contract.list_field
        );
        return Ok(contract);
    }

    Err(SyncError::Detection { tried })
}
