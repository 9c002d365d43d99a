use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_CHANNEL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
///
/// Built once at process start and handed to the pipeline; nothing below
/// `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    // Source
    pub channel: String,
    pub base_url: String,

    // Selection
    pub target_count: usize,
    pub min_post_length: usize,
    pub filtering_enabled: bool,
    pub text_preview_limit: usize,

    // Network
    pub feed_timeout: Duration,
    pub stats_timeout: Duration,
    pub stats_delay: Duration,
    pub stats_mode: String,

    // Output
    pub output_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Source
            channel: normalize_channel(&env_or_default("CHANNEL_USERNAME", DEFAULT_CHANNEL)),
            base_url: env_or_default("FEED_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),

            // Selection
            target_count: parse_env_usize("WANTED_POSTS_COUNT", 3)?,
            min_post_length: parse_env_usize("MIN_POST_LENGTH", 100)?,
            filtering_enabled: parse_env_bool("FILTERING_ENABLED", true)?,
            text_preview_limit: parse_env_usize("TEXT_PREVIEW_LIMIT", 200)?,

            // Network
            feed_timeout: Duration::from_secs(parse_env_u64("FEED_TIMEOUT_SECS", 10)?),
            stats_timeout: Duration::from_secs(parse_env_u64("STATS_TIMEOUT_SECS", 5)?),
            stats_delay: Duration::from_millis(parse_env_u64("STATS_DELAY_MS", 500)?),
            stats_mode: env_or_default("STATS_MODE", "tme"),

            // Output
            output_path: PathBuf::from(env_or_default("OUTPUT_PATH", "posts.json")),
        })
    }

    /// Configuration for tests: no pacing, short timeouts, filtering on.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            channel: "testchannel".to_string(),
            base_url: "http://127.0.0.1".to_string(),
            target_count: 3,
            min_post_length: 100,
            filtering_enabled: true,
            text_preview_limit: 200,
            feed_timeout: Duration::from_secs(5),
            stats_timeout: Duration::from_secs(2),
            stats_delay: Duration::ZERO,
            stats_mode: "tme".to_string(),
            output_path: PathBuf::from("posts.json"),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CHANNEL_USERNAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.channel.contains('/') {
            return Err(ConfigError::InvalidValue {
                name: "CHANNEL_USERNAME".to_string(),
                message: format!("must be a bare channel name, got '{}'", self.channel),
            });
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "FEED_BASE_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.base_url),
            });
        }
        if self.target_count == 0 {
            return Err(ConfigError::InvalidValue {
                name: "WANTED_POSTS_COUNT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.text_preview_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "TEXT_PREVIEW_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.feed_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "FEED_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.stats_timeout.is_zero() || self.stats_timeout > self.feed_timeout {
            return Err(ConfigError::InvalidValue {
                name: "STATS_TIMEOUT_SECS".to_string(),
                message: "must be between 1 and FEED_TIMEOUT_SECS".to_string(),
            });
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "OUTPUT_PATH".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// URL of the public preview feed, e.g. `https://t.me/s/channel`.
    #[must_use]
    pub fn feed_url(&self) -> String {
        format!("{}/s/{}", self.base_url, self.channel)
    }

    /// URL of the channel itself, sent as `Referer` on stats requests.
    #[must_use]
    pub fn channel_url(&self) -> String {
        format!("{}/{}", self.base_url, self.channel)
    }
}

/// Accept `@name` as well as `name`.
fn normalize_channel(value: &str) -> String {
    value.trim().trim_start_matches('@').to_string()
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
