// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Stored as TOML, by default in `<config dir>/tether/config.toml`:
//!
//! ```toml
//! [http]
//! base_url = "https://admin.example.com/api"
//! retry_count = 3
//! cache_ttl_ms = 0        # 0 = caching off
//!
//! [socket]
//! url = "wss://admin.example.com/ws"
//! heartbeat_interval_ms = 30000   # 0 = disabled
//! ```
//!
//! Every key is optional and falls back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::{BackoffPolicy, RequestOptions};
use crate::socket::SocketOptions;

const CONFIG_DIR_NAME: &str = "tether";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub socket: SocketConfig,
}

/// Request client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Prefix for every request target.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Retries after the first attempt (default: 3).
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Base backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Upper bound of the random jitter in milliseconds (default: 1000).
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
    /// Backoff cap in milliseconds (default: 10000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-attempt transport timeout in milliseconds (default: 30000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// GET cache lifetime in milliseconds. 0 = disabled.
    #[serde(default)]
    pub cache_ttl_ms: u64,
}

/// Socket client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketConfig {
    #[serde(default = "default_socket_url")]
    pub url: String,
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
    /// Delay before each reconnect attempt in milliseconds (default: 3000).
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Reconnect attempts before giving up (default: 5).
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Heartbeat ping interval in milliseconds (default: 30000). 0 = disabled.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_jitter_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_socket_url() -> String {
    "ws://127.0.0.1:8000/ws".to_string()
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    3_000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            base_url: default_base_url(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            jitter_ms: default_jitter_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_ms: 0,
        }
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        SocketConfig {
            url: default_socket_url(),
            auto_reconnect: default_auto_reconnect(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            base: Duration::from_millis(self.retry_delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
            cap: Duration::from_millis(self.max_delay_ms),
        }
    }

    /// Default per-call options derived from this config.
    pub fn request_options(&self) -> RequestOptions {
        let options = RequestOptions::default()
            .retry_count(self.retry_count)
            .backoff(self.backoff());
        if self.cache_ttl_ms == 0 {
            options
        } else {
            options.cache_ttl(Duration::from_millis(self.cache_ttl_ms))
        }
    }
}

impl SocketConfig {
    pub fn socket_options(&self) -> SocketOptions {
        SocketOptions::new(&self.url)
            .auto_reconnect(self.auto_reconnect)
            .reconnect_interval(Duration::from_millis(self.reconnect_interval_ms))
            .max_reconnect_attempts(self.max_reconnect_attempts)
            .heartbeat_interval(Duration::from_millis(self.heartbeat_interval_ms))
    }
}

impl Config {
    /// Default location: `<config dir>/tether/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse and validate TOML text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Load from the default location, or return defaults if there is none.
    pub fn load_or_default() -> ConfigResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(io_error)
    }

    /// Check URL schemes and numeric ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        let http = &self.http;
        if !(http.base_url.starts_with("http://") || http.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "http.base_url must start with http:// or https://, got '{}'",
                http.base_url
            )));
        }
        if http.max_delay_ms < http.retry_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "http.max_delay_ms ({}) is below http.retry_delay_ms ({})",
                http.max_delay_ms, http.retry_delay_ms
            )));
        }
        if http.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_ms must be greater than 0".to_string(),
            ));
        }

        let socket = &self.socket;
        if !(socket.url.starts_with("ws://") || socket.url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "socket.url must start with ws:// or wss://, got '{}'",
                socket.url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
