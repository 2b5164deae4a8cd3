//! Server configuration from the environment.
//!
//! | Variable                 | Default                  |
//! |--------------------------|--------------------------|
//! | `BUS_FEED_URL`           | public KMB route ETA URL |
//! | `BUS_FEED_TIMEOUT_SECS`  | 10                       |
//! | `BUS_FEED_LIVE_TTL_SECS` | 30                       |
//! | `BUS_FEED_MOCK_TTL_SECS` | live TTL / 3             |
//! | `BUS_FEED_BIND`          | 127.0.0.1:3000           |

use std::net::SocketAddr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::feed::FeedConfig;

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Configuration errors, reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("mock TTL ({mock:?}) must be shorter than live TTL ({live:?})")]
    MockTtlNotShorter { mock: Duration, live: Duration },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,
    /// Upstream feed client settings
    pub feed: FeedConfig,
    /// Cache TTLs and fetch timeout
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(DEFAULT_BIND),
            feed: FeedConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("BUS_FEED_BIND") {
            config.bind = bind.parse().map_err(|_| ConfigError::InvalidVar {
                var: "BUS_FEED_BIND",
                value: bind,
            })?;
        }

        if let Some(url) = lookup("BUS_FEED_URL").filter(|u| !u.trim().is_empty()) {
            config.feed.url = url;
        }

        if let Some(secs) = parse_secs(&lookup, "BUS_FEED_TIMEOUT_SECS")? {
            config.feed.timeout_secs = secs;
            config.cache.fetch_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_secs(&lookup, "BUS_FEED_LIVE_TTL_SECS")? {
            config.cache = config.cache.with_live_ttl(Duration::from_secs(secs));
        }

        if let Some(secs) = parse_secs(&lookup, "BUS_FEED_MOCK_TTL_SECS")? {
            config.cache = config.cache.with_mock_ttl(Duration::from_secs(secs));
        }

        config.cache.validate()?;
        Ok(config)
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidVar { var, value })
        })
        .transpose()
}
