//! Service configuration
//!
//! Every setting has a default and may be overridden by an `ORDER_WALL_*`
//! environment variable. Unset or blank variables keep the default; a set
//! but unparseable one is an error.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use types::ids::Venue;
use types::numeric::NumericPolicy;
use types::side::SideFilter;

use crate::error::ConfigError;
use crate::query::SnapshotQuery;

pub const DEFAULT_API_URL: &str = "http://localhost:8787";
pub const DEFAULT_PATH: &str = "/liquidity/order-wall";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(4_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_DISPLAY_LEVELS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWallConfig {
    pub api_url: String,
    pub path: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub query: SnapshotQuery,
    pub numeric_policy: NumericPolicy,
    /// Rows per side printed by the CLI.
    pub display_levels: usize,
}

impl Default for OrderWallConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            path: DEFAULT_PATH.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            query: SnapshotQuery::default(),
            numeric_policy: NumericPolicy::default(),
            display_levels: DEFAULT_DISPLAY_LEVELS,
        }
    }
}

impl OrderWallConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = var("ORDER_WALL_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = var("ORDER_WALL_PATH") {
            config.path = if path.starts_with('/') {
                path
            } else {
                format!("/{}", path)
            };
        }
        if let Some(ms) = var("ORDER_WALL_POLL_INTERVAL_MS") {
            config.poll_interval = parse_millis("ORDER_WALL_POLL_INTERVAL_MS", &ms)?;
        }
        if let Some(ms) = var("ORDER_WALL_TIMEOUT_MS") {
            config.request_timeout = parse_millis("ORDER_WALL_TIMEOUT_MS", &ms)?;
        }
        if let Some(decimals) = var("ORDER_WALL_DECIMALS") {
            let decimals: u32 = parse("ORDER_WALL_DECIMALS", &decimals)?;
            config.query = config.query.with_decimals(decimals);
        }
        if let Some(quote) = var("ORDER_WALL_QUOTE") {
            config.query.quote = quote.to_ascii_uppercase();
        }
        if let Some(sources) = var("ORDER_WALL_SOURCES") {
            let venues: Vec<Venue> = sources
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(Venue::new)
                .collect();
            for venue in venues.iter().filter(|v| !v.is_known()) {
                warn!(venue = %venue, "Unrecognised venue in ORDER_WALL_SOURCES");
            }
            config.query = config.query.with_sources(venues);
        }
        if let Some(side) = var("ORDER_WALL_SIDE") {
            let side: SideFilter = parse("ORDER_WALL_SIDE", &side)?;
            config.query = config.query.with_side(side);
        }
        if let Some(policy) = var("ORDER_WALL_NUMERIC_POLICY") {
            config.numeric_policy = parse("ORDER_WALL_NUMERIC_POLICY", &policy)?;
        }
        if let Some(levels) = var("ORDER_WALL_DISPLAY_LEVELS") {
            config.display_levels = parse("ORDER_WALL_DISPLAY_LEVELS", &levels)?;
        }

        Ok(config)
    }

    /// Full snapshot endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_url, self.path)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| ConfigError::invalid(var, e))
}

fn parse_millis(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = parse(var, value)?;
    if ms == 0 {
        return Err(ConfigError::invalid(var, "must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}
