// src/models/region.rs
use std::collections::HashMap;
use std::fmt;
use serde::Serialize;
use crate::models::server::ServerIdentifier;

/// Lowercase region label such as `us-west` or `eu-central`.
///
/// Doubles as the CSS class and icon name of the region cell, so it is
/// restricted to `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Region(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    Empty,
    InvalidCharacter(String),
    MalformedEntry(String),
    DuplicateEntry(String),
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Region name is empty"),
            Self::InvalidCharacter(name) => write!(f, "Invalid region name: {}", name),
            Self::MalformedEntry(entry) => write!(f, "Malformed region map entry: {}", entry),
            Self::DuplicateEntry(id) => write!(f, "Server {} mapped to more than one region", id),
        }
    }
}

impl std::error::Error for RegionError {}

impl Region {
    pub fn parse(raw: &str) -> Result<Self, RegionError> {
        let name = raw.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(RegionError::Empty);
        }
        if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            return Err(RegionError::InvalidCharacter(raw.to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn icon_path(&self) -> String {
        format!("/img/{}.svg", self.0)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit identifier → region table with a fallback for unlisted servers.
#[derive(Debug, Clone)]
pub struct RegionMap {
    entries: HashMap<ServerIdentifier, Region>,
    default: Region,
}

impl RegionMap {
    pub fn new(default: Region) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// Parses `ip=region` pairs separated by `;` or `,`. Blank segments are ignored.
    pub fn parse(spec: &str, default: Region) -> Result<Self, RegionError> {
        let mut map = Self::new(default);
        for entry in spec.split(|c: char| c == ';' || c == ',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (id, region) = entry
                .split_once('=')
                .ok_or_else(|| RegionError::MalformedEntry(entry.to_string()))?;
            let id = ServerIdentifier::parse(id)
                .map_err(|_| RegionError::MalformedEntry(entry.to_string()))?;
            let region = Region::parse(region)?;
            map.insert(id, region)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, id: ServerIdentifier, region: Region) -> Result<(), RegionError> {
        if self.entries.contains_key(&id) {
            return Err(RegionError::DuplicateEntry(id.to_string()));
        }
        self.entries.insert(id, region);
        Ok(())
    }

    pub fn classify(&self, id: &ServerIdentifier) -> &Region {
        self.entries
            .get(id)
            .or_else(|| id.host().and_then(|host| self.entries.get(&host)))
            .unwrap_or(&self.default)
    }

    pub fn default_region(&self) -> &Region {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ServerIdentifier {
        ServerIdentifier::parse(raw).unwrap()
    }

    #[test]
    fn region_names_are_normalized() {
        assert_eq!(Region::parse(" US-West ").unwrap().as_str(), "us-west");
        assert_eq!(Region::parse("").unwrap_err(), RegionError::Empty);
        assert!(matches!(Region::parse("eu central"), Err(RegionError::InvalidCharacter(_))));
    }

    #[test]
    fn classify_falls_back_to_default() {
        let map = RegionMap::parse(
            "54.193.198.90=us-west; 10.0.0.7=ap-south",
            Region::parse("eu-central").unwrap(),
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.classify(&id("54.193.198.90")).as_str(), "us-west");
        assert_eq!(map.classify(&id("10.0.0.7")).as_str(), "ap-south");
        assert_eq!(map.classify(&id("1.2.3.4")).as_str(), "eu-central");
    }

    #[test]
    fn classify_matches_host_when_port_is_present() {
        let map = RegionMap::parse("54.193.198.90=us-west", Region::parse("eu-central").unwrap())
            .unwrap();
        assert_eq!(map.classify(&id("54.193.198.90:27016")).as_str(), "us-west");
    }

    #[test]
    fn malformed_and_duplicate_entries_are_rejected() {
        let default = Region::parse("eu-central").unwrap();
        assert!(matches!(
            RegionMap::parse("54.193.198.90", default.clone()),
            Err(RegionError::MalformedEntry(_))
        ));
        assert!(matches!(
            RegionMap::parse("1.1.1.1=us-west;1.1.1.1=eu-west", default.clone()),
            Err(RegionError::DuplicateEntry(_))
        ));
        assert!(RegionMap::parse(" ; ", default).unwrap().is_empty());
    }
}
