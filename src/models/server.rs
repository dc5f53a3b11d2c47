// src/models/server.rs
use std::fmt;
use std::net::{Ipv6Addr, SocketAddr};
use serde::{Deserialize, Serialize};
use crate::models::region::{Region, RegionMap};

/// Opaque server address as handed out by the directory: an IP or hostname,
/// optionally followed by `:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerIdentifier(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    ContainsWhitespace(String),
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Server identifier is empty"),
            Self::ContainsWhitespace(raw) => write!(f, "Server identifier contains whitespace: {:?}", raw),
        }
    }
}

impl std::error::Error for IdentifierError {}

impl ServerIdentifier {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdentifierError::ContainsWhitespace(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_port(&self) -> bool {
        if self.0.parse::<SocketAddr>().is_ok() {
            return true;
        }
        match self.0.rsplit_once(':') {
            Some((host, port)) => !host.contains(':') && port.parse::<u16>().is_ok(),
            None => false,
        }
    }

    /// The identifier without its port, if it carries one.
    pub fn host(&self) -> Option<ServerIdentifier> {
        if let Ok(addr) = self.0.parse::<SocketAddr>() {
            return Some(Self(addr.ip().to_string()));
        }
        if !self.has_port() {
            return None;
        }
        self.0.rsplit_once(':').map(|(host, _)| Self(host.to_string()))
    }
}

impl fmt::Display for ServerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServerIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One server's live state, produced fresh by every status fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerStatus {
    pub id: ServerIdentifier,
    pub address: String,
    pub region: Region,
    pub online: bool,
    pub map: String,
    pub players: u32,
    pub max_players: u32,
    pub hostname: Option<String>,
}

impl ServerStatus {
    /// Address suitable for `steam://connect/`, with `default_port` appended
    /// when the reported address has none.
    pub fn connect_address(&self, default_port: u16) -> String {
        let addr = self.address.as_str();
        if let Ok(v6) = addr.parse::<Ipv6Addr>() {
            return format!("[{}]:{}", v6, default_port);
        }
        match ServerIdentifier::parse(addr) {
            Ok(id) if id.has_port() => addr.to_string(),
            _ => format!("{}:{}", addr, default_port),
        }
    }
}

/// Player counts arrive as numbers from some backends and strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Number(u32),
    Text(String),
}

impl Count {
    fn value(&self, field: &'static str) -> Result<u32, PayloadError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| PayloadError::InvalidField(field, s.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    MissingField(&'static str),
    InvalidField(&'static str, String),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(name) => write!(f, "Missing field `{}`", name),
            Self::InvalidField(name, value) => write!(f, "Invalid value for `{}`: {}", name, value),
        }
    }
}

impl std::error::Error for PayloadError {}

/// Status payload of the same-origin API (`/api/server-info?ip=`).
#[derive(Debug, Clone, Deserialize)]
pub struct SameOriginStatus {
    pub public_ip: Option<String>,
    pub map: Option<String>,
    #[serde(alias = "human_players")]
    pub players: Option<Count>,
    pub max_players: Option<Count>,
    pub hostname: Option<String>,
}

impl SameOriginStatus {
    pub fn into_status(self, id: &ServerIdentifier, regions: &RegionMap) -> Result<ServerStatus, PayloadError> {
        let map = self.map.ok_or(PayloadError::MissingField("map"))?;
        let players = self.players.ok_or(PayloadError::MissingField("players"))?.value("players")?;
        let max_players = self
            .max_players
            .ok_or(PayloadError::MissingField("max_players"))?
            .value("max_players")?;

        Ok(ServerStatus {
            id: id.clone(),
            address: non_empty(self.public_ip).unwrap_or_else(|| id.to_string()),
            region: regions.classify(id).clone(),
            online: true,
            map,
            players,
            max_players,
            hostname: non_empty(self.hostname),
        })
    }
}

/// Status payload served directly by each game server (`/server-info`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStatus {
    #[serde(alias = "public_ip")]
    pub ip: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub map: Option<String>,
    #[serde(alias = "human_players")]
    pub players: Option<Count>,
    #[serde(alias = "max_players")]
    pub max_players: Option<Count>,
    pub hostname: Option<String>,
}

impl ExternalStatus {
    pub fn into_status(self, id: &ServerIdentifier, regions: &RegionMap) -> Result<ServerStatus, PayloadError> {
        let map = self.map.ok_or(PayloadError::MissingField("map"))?;
        let players = self.players.ok_or(PayloadError::MissingField("players"))?.value("players")?;
        let max_players = self
            .max_players
            .ok_or(PayloadError::MissingField("maxPlayers"))?
            .value("maxPlayers")?;

        // A region reported by the server wins over the configured table.
        let region = match self.region.as_deref().map(Region::parse) {
            Some(Ok(region)) => region,
            Some(Err(e)) => {
                log::debug!("Ignoring region reported by {}: {}", id, e);
                regions.classify(id).clone()
            }
            None => regions.classify(id).clone(),
        };

        Ok(ServerStatus {
            id: id.clone(),
            address: non_empty(self.ip).unwrap_or_else(|| id.to_string()),
            region,
            online: self.status.as_deref().map_or(true, is_online),
            map,
            players,
            max_players,
            hostname: non_empty(self.hostname),
        })
    }
}

fn is_online(status: &str) -> bool {
    matches!(status.trim().to_ascii_lowercase().as_str(), "online" | "up" | "running" | "ok")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
