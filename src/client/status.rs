// src/client/status.rs
use log::debug;
use crate::client::FetchError;
use crate::config::ApiVariant;
use crate::models::region::RegionMap;
use crate::models::server::{ExternalStatus, SameOriginStatus, ServerIdentifier, ServerStatus};

pub fn status_url(variant: &ApiVariant, id: &ServerIdentifier) -> String {
    match variant {
        ApiVariant::SameOrigin { base_url } => format!("{}/api/server-info", base_url.trim_end_matches('/')),
        // The template carries its own port, so a game port on the id is dropped.
        ApiVariant::External { status_template, .. } => {
            let host = id.host().unwrap_or_else(|| id.clone());
            status_template.replace("{ip}", host.as_str())
        }
    }
}

pub async fn fetch_server_info(
    client: &reqwest::Client,
    variant: &ApiVariant,
    regions: &RegionMap,
    id: &ServerIdentifier
) -> Result<ServerStatus, FetchError> {
    let url = status_url(variant, id);
    debug!("Fetching server info for {} from {}", id, url);

    let request = match variant {
        ApiVariant::SameOrigin { .. } => client.get(&url).query(&[("ip", id.as_str())]),
        ApiVariant::External { .. } => client.get(&url),
    };

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    let body = response.bytes().await?;

    let status = match variant {
        ApiVariant::SameOrigin { .. } => serde_json::from_slice::<SameOriginStatus>(&body)?.into_status(id, regions)?,
        ApiVariant::External { .. } => serde_json::from_slice::<ExternalStatus>(&body)?.into_status(id, regions)?,
    };
    Ok(status)
}
