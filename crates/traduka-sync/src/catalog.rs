use serde::Deserialize;
use traduka_fetch::HttpClient;

use crate::error::CatalogError;
use crate::record::ModelRecord;

#[derive(Debug, Deserialize)]
struct CatalogPayload {
    data: Vec<ModelRecord>,
}

/// One GET to the catalog endpoint, decoded as `{ "data": [record, ...] }`.
///
/// Network failures, non-success statuses, and decode failures are all fatal
/// here; there is no per-record salvage of a malformed catalog. Record order
/// is catalog order.
pub(crate) async fn fetch_catalog<C: HttpClient>(
    client: &C,
    records_url: &str,
) -> Result<Vec<ModelRecord>, CatalogError> {
    let body = client
        .get_bytes(records_url)
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;
    let payload: CatalogPayload = serde_json::from_slice(&body)?;
    tracing::info!(records = payload.data.len(), "catalog fetched");
    Ok(payload.data)
}
