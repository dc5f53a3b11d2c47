use std::env;
use std::fmt;
use std::time::Duration;
use std::num::NonZeroU32;
use std::str::FromStr;
use governor::Quota;
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use crate::models::region::{Region, RegionError, RegionMap};

lazy_static! {
    static ref DEFAULT_REGION_MAP: &'static str = "54.193.198.90=us-west";
    static ref DEFAULT_EXTERNAL_DIRECTORY: &'static str = "https://api.example.com/servers";
    static ref DEFAULT_STATUS_TEMPLATE: &'static str = "http://{ip}:8000/server-info";
}

/// Which backend shape the board talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiVariant {
    /// Directory and status both proxied by the site's own API:
    /// `{base}/api/server-ips` and `{base}/api/server-info?ip={id}`.
    SameOrigin { base_url: String },
    /// Fixed external directory URL; status queried on each game server
    /// through a URL template containing `{ip}`.
    External { directory_url: String, status_template: String },
}

impl ApiVariant {
    pub fn directory_url(&self) -> String {
        match self {
            Self::SameOrigin { base_url } => format!("{}/api/server-ips", base_url.trim_end_matches('/')),
            Self::External { directory_url, .. } => directory_url.clone(),
        }
    }

    fn default_poll_interval_secs(&self) -> u64 {
        match self {
            Self::SameOrigin { .. } => 35,
            Self::External { .. } => 30,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownVariant(String),
    MissingPlaceholder(String),
    InvalidUrl(String),
    InvalidProxy(String),
    Region(RegionError),
    ZeroInterval,
    ZeroRefreshLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariant(v) => write!(f, "Unknown API_VARIANT {:?} (expected same-origin or external)", v),
            Self::MissingPlaceholder(t) => write!(f, "STATUS_URL_TEMPLATE {:?} does not contain {{ip}}", t),
            Self::InvalidUrl(u) => write!(f, "Invalid URL: {}", u),
            Self::InvalidProxy(p) => write!(f, "Invalid TRUSTED_PROXIES entry: {}", p),
            Self::Region(e) => write!(f, "Invalid region configuration: {}", e),
            Self::ZeroInterval => write!(f, "POLL_INTERVAL_SECS and DIRECTORY_TIMEOUT_MS must be non-zero"),
            Self::ZeroRefreshLimit => write!(f, "REFRESH_PERIOD_SECS and REFRESH_BURST_LIMIT must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<RegionError> for ConfigError {
    fn from(e: RegionError) -> Self {
        Self::Region(e)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,

    pub variant: ApiVariant,
    pub poll_interval: Duration,
    pub directory_timeout: Duration,
    pub status_timeout: Duration,
    pub supersede_stale_fetches: bool,

    // Rendering
    pub connect_port: u16,
    pub regions: RegionMap,

    // Manual refresh rate limiting
    pub refresh_period_secs: u64,
    pub refresh_burst_limit: u32,
    // Peers allowed to set X-Forwarded-For
    pub trusted_proxies: Vec<IpNetwork>,
}

impl Default for Config {
    fn default() -> Self {
        let default_region = Region::parse("eu-central").expect("valid built-in region");
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8081,
            variant: ApiVariant::SameOrigin { base_url: "http://127.0.0.1:8080".to_string() },
            poll_interval: Duration::from_secs(35),
            directory_timeout: Duration::from_millis(5000),
            status_timeout: Duration::from_millis(10_000),
            supersede_stale_fetches: false,
            connect_port: 27015,
            regions: RegionMap::parse(*DEFAULT_REGION_MAP, default_region).expect("valid built-in region map"),
            refresh_period_secs: 5,
            refresh_burst_limit: 3,
            trusted_proxies: Vec::new(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Comma-separated CIDR blocks or bare addresses.
fn parse_trusted_proxies(raw: &str) -> Result<Vec<IpNetwork>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| IpNetwork::from_str(entry).map_err(|e| ConfigError::InvalidProxy(format!("{}: {}", entry, e))))
        .collect()
}

fn check_url(raw: &str) -> Result<(), ConfigError> {
    // `{ip}` is not a valid host, so templates are checked with a stand-in.
    reqwest::Url::parse(&raw.replace("{ip}", "127.0.0.1"))
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw, e)))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let variant = match env_string("API_VARIANT", "same-origin").to_ascii_lowercase().as_str() {
            "same-origin" | "a" => ApiVariant::SameOrigin {
                base_url: env_string("API_BASE_URL", "http://127.0.0.1:8080"),
            },
            "external" | "b" => ApiVariant::External {
                directory_url: env_string("DIRECTORY_URL", *DEFAULT_EXTERNAL_DIRECTORY),
                status_template: env_string("STATUS_URL_TEMPLATE", *DEFAULT_STATUS_TEMPLATE),
            },
            other => return Err(ConfigError::UnknownVariant(other.to_string())),
        };

        let default_region = Region::parse(&env_string("DEFAULT_REGION", "eu-central"))?;
        let regions = RegionMap::parse(&env_string("REGION_MAP", *DEFAULT_REGION_MAP), default_region)?;

        let config = Self {
            bind_address: env_string("BIND_ADDRESS", "0.0.0.0"),
            port: env_or("PORT", 8081),
            poll_interval: Duration::from_secs(env_or("POLL_INTERVAL_SECS", variant.default_poll_interval_secs())),
            directory_timeout: Duration::from_millis(env_or("DIRECTORY_TIMEOUT_MS", 5000)),
            status_timeout: Duration::from_millis(env_or("STATUS_TIMEOUT_MS", 10_000)),
            supersede_stale_fetches: env_or("SUPERSEDE_STALE_FETCHES", false),
            connect_port: env_or("CONNECT_PORT", 27015),
            regions,
            refresh_period_secs: env_or("REFRESH_PERIOD_SECS", 5),
            refresh_burst_limit: env_or("REFRESH_BURST_LIMIT", 3),
            trusted_proxies: parse_trusted_proxies(&env_string("TRUSTED_PROXIES", ""))?,
            variant,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.variant {
            ApiVariant::SameOrigin { base_url } => check_url(base_url)?,
            ApiVariant::External { directory_url, status_template } => {
                check_url(directory_url)?;
                if !status_template.contains("{ip}") {
                    return Err(ConfigError::MissingPlaceholder(status_template.clone()));
                }
                check_url(status_template)?;
            }
        }
        if self.poll_interval.is_zero() || self.directory_timeout.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.refresh_period_secs == 0 || self.refresh_burst_limit == 0 {
            return Err(ConfigError::ZeroRefreshLimit);
        }
        Ok(())
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn refresh_quota(&self) -> Quota {
        // validate() rejects zero values, the fallbacks only guard direct construction.
        let burst = NonZeroU32::new(self.refresh_burst_limit).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.refresh_period_secs.max(1)))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst)
    }
}
