// src/client/mod.rs
pub mod directory;
pub mod status;

use std::fmt;
use std::future::Future;
use std::time::Duration;
use log::error;
use crate::config::{ApiVariant, Config};
use crate::models::region::RegionMap;
use crate::models::server::{PayloadError, ServerIdentifier, ServerStatus};

#[derive(Debug)]
pub enum FetchError {
    Network(reqwest::Error),
    Status(reqwest::StatusCode),
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Request failed: {}", e),
            Self::Status(code) => write!(f, "Server returned status code {}", code),
            Self::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<PayloadError> for FetchError {
    fn from(e: PayloadError) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Where the poll loop gets its data from.
///
/// Both calls swallow their own failures: the lister answers with an empty
/// list, the fetcher with `None`.
pub trait ServerSource: Send + Sync + 'static {
    fn list_servers(&self) -> impl Future<Output = Vec<ServerIdentifier>> + Send;

    fn fetch_status(&self, id: &ServerIdentifier) -> impl Future<Output = Option<ServerStatus>> + Send;
}

/// `ServerSource` backed by the configured HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    variant: ApiVariant,
    regions: RegionMap,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.status_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self::with_client(client, config.variant.clone(), config.regions.clone()))
    }

    pub fn with_client(client: reqwest::Client, variant: ApiVariant, regions: RegionMap) -> Self {
        Self { client, variant, regions }
    }
}

impl ServerSource for HttpSource {
    async fn list_servers(&self) -> Vec<ServerIdentifier> {
        match directory::fetch_server_ids(&self.client, &self.variant).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Error fetching server IPs: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_status(&self, id: &ServerIdentifier) -> Option<ServerStatus> {
        match status::fetch_server_info(&self.client, &self.variant, &self.regions, id).await {
            Ok(info) => Some(info),
            Err(e) => {
                error!("Error fetching server info for {}: {}", id, e);
                None
            }
        }
    }
}
