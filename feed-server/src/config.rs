use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::feed::DiffHighlight;

pub const DEFAULT_FEED_ITEM_MAX: usize = 50;
pub const DEFAULT_FEED_SIZE_THRESHOLD: usize = 1024 * 1024;
pub const DEFAULT_EXCLUDED_TITLE_MARKER: &str = "pushed to gh-pages at";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Upstream Atom feed that is polled for compare links
    pub source_feed_url: String,
    /// Public URL of this service (feed self link and idle ping target)
    pub public_base_url: Option<String>,
    pub feed_title: String,
    pub feed_item_max: usize,
    /// Bodies larger than this many bytes are replaced by a placeholder
    pub feed_size_threshold: usize,
    pub poll_interval: Duration,
    pub idle_ping_interval: Duration,
    pub idle_ping_enabled: bool,
    pub http_timeout: Duration,
    /// Also fetch `.diff` bodies and publish them annotated
    pub fetch_diff: bool,
    pub diff_highlight: DiffHighlight,
    pub excluded_title_markers: Vec<String>,
    pub compare_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT").ok_or(ConfigError::Missing("PORT"))?;
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value: port.clone(),
        })?;

        let source_feed_url = var("SOURCE_FEED_URL")
            .or_else(|| var("GITHUB_FEED_URL"))
            .ok_or(ConfigError::Missing("SOURCE_FEED_URL"))?;

        let public_base_url = var("PUBLIC_BASE_URL")
            .or_else(|| var("HEROKU_URL"))
            .map(|url| url.trim_end_matches('/').to_string());

        let excluded_title_markers = match var("EXCLUDED_TITLE_MARKERS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect(),
            None => vec![DEFAULT_EXCLUDED_TITLE_MARKER.to_string()],
        };

        Ok(Self {
            port,
            source_feed_url,
            public_base_url,
            feed_title: var("FEED_TITLE").unwrap_or_else(|| "github-diff-feed".to_string()),
            feed_item_max: parse_or(&var, "FEED_ITEM_MAX", DEFAULT_FEED_ITEM_MAX)?,
            feed_size_threshold: parse_or(
                &var,
                "FEED_SIZE_THRESHOLD",
                DEFAULT_FEED_SIZE_THRESHOLD,
            )?,
            poll_interval: parse_secs(&var, "POLL_INTERVAL_SECS", 300)?,
            idle_ping_interval: parse_secs(&var, "IDLE_PING_INTERVAL_SECS", 900)?,
            idle_ping_enabled: parse_or(&var, "IDLE_PING_ENABLED", true)?,
            http_timeout: parse_secs(&var, "HTTP_TIMEOUT_SECS", 30)?,
            fetch_diff: parse_or(&var, "FETCH_DIFF", true)?,
            diff_highlight: parse_or(&var, "DIFF_HIGHLIGHT", DiffHighlight::Words)?,
            excluded_title_markers,
            compare_host: var("COMPARE_HOST").unwrap_or_else(|| "github.com".to_string()),
        })
    }

    /// Idle ping target, if pinging is enabled and a public URL is known
    pub fn idle_ping_url(&self) -> Option<String> {
        if !self.idle_ping_enabled {
            return None;
        }
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/ping", base))
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.clone(),
        }),
        None => Ok(default),
    }
}

/// A period in whole seconds; zero is rejected since timers need a non-zero period
fn parse_secs<F>(var: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(var, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: var(key).unwrap_or_default(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
