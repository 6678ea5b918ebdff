//! Runtime settings: built-in defaults, overridden by `STOCKSCOPE_*`
//! environment variables, then by explicit setters (CLI flags).

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_DIRECTORY_PATH: &str = "data/exchange_lookup.csv";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_PEER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

const ENV_DIRECTORY: &str = "STOCKSCOPE_DIRECTORY";
const ENV_CACHE_TTL_SECS: &str = "STOCKSCOPE_CACHE_TTL_SECS";
const ENV_PEER_TIMEOUT_MS: &str = "STOCKSCOPE_PEER_TIMEOUT_MS";
const ENV_REQUESTS_PER_MINUTE: &str = "STOCKSCOPE_REQUESTS_PER_MINUTE";
const ENV_HTTP_TIMEOUT_MS: &str = "STOCKSCOPE_HTTP_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockscopeConfig {
    pub directory_path: PathBuf,
    /// Zero disables caching.
    pub cache_ttl: Duration,
    pub peer_timeout: Duration,
    pub requests_per_minute: u32,
    pub http_timeout_ms: u64,
}

impl Default for StockscopeConfig {
    fn default() -> Self {
        Self {
            directory_path: PathBuf::from(DEFAULT_DIRECTORY_PATH),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            peer_timeout: Duration::from_millis(DEFAULT_PEER_TIMEOUT_MS),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

impl StockscopeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DIRECTORY).filter(|value| !value.trim().is_empty()) {
            config.directory_path = PathBuf::from(path.trim());
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_CACHE_TTL_SECS) {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_PEER_TIMEOUT_MS) {
            config.peer_timeout = Duration::from_millis(ms);
        }
        if let Some(rpm) = parse_var::<u32, _>(&lookup, ENV_REQUESTS_PER_MINUTE) {
            config.requests_per_minute = rpm;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_HTTP_TIMEOUT_MS) {
            config.http_timeout_ms = ms;
        }

        config
    }

    pub fn with_directory_path(mut self, path: impl AsRef<Path>) -> Self {
        self.directory_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = timeout;
        self
    }

    pub fn with_requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    pub fn with_http_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http_timeout_ms = timeout_ms;
        self
    }

    pub fn caching_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
