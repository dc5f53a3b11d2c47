// src/client/directory.rs
use std::collections::HashSet;
use log::{debug, warn};
use serde_json::Value;
use crate::client::FetchError;
use crate::config::ApiVariant;
use crate::models::server::ServerIdentifier;

/// Fetches the list of active server identifiers from the directory endpoint.
///
/// Entries that are not valid identifiers are skipped; duplicates keep their
/// first position.
pub async fn fetch_server_ids(
    client: &reqwest::Client,
    variant: &ApiVariant
) -> Result<Vec<ServerIdentifier>, FetchError> {
    let url = variant.directory_url();
    debug!("Fetching server list from {}", url);

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let body = response.json::<Value>().await?;
    parse_server_ids(body)
}

pub fn parse_server_ids(body: Value) -> Result<Vec<ServerIdentifier>, FetchError> {
    let entries = match body {
        Value::Array(entries) => entries,
        other => return Err(FetchError::Parse(format!("expected a JSON array, got {}", other))),
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        let raw = match entry.as_str() {
            Some(raw) => raw,
            None => {
                warn!("Skipping non-string directory entry: {}", entry);
                continue;
            }
        };
        match ServerIdentifier::parse(raw) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            Err(e) => warn!("Skipping directory entry: {}", e),
        }
    }

    debug!("Directory listed {} servers", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicates_and_junk_are_dropped() {
        let ids = parse_server_ids(json!(["1.1.1.1", 42, "", "2.2.2.2", "1.1.1.1"])).unwrap();
        let ids: Vec<&str> = ids.iter().map(ServerIdentifier::as_str).collect();
        assert_eq!(ids, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn non_array_body_is_a_parse_error() {
        assert!(matches!(
            parse_server_ids(json!({ "error": "boom" })),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn empty_array_is_ok() {
        assert!(parse_server_ids(json!([])).unwrap().is_empty());
    }
}
