//! Runtime configuration.
//!
//! Values come from an optional YAML file named by `PATHWIRE_CONFIG`;
//! anything missing falls back to defaults. `LISTEN` overrides the listen
//! address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::http::parser::DEFAULT_MAX_REQUEST_BYTES;
use crate::http::registry::DEFAULT_CAPACITY;

pub const CONFIG_ENV: &str = "PATHWIRE_CONFIG";
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Size of the route table.
    #[serde(default = "default_max_routes")]
    pub max_routes: usize,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backing file. `None` keeps the store in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_store_size")]
    pub size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_clock_enabled")]
    pub enabled: bool,
    #[serde(default = "default_clock_server")]
    pub server: String,
    #[serde(default = "default_clock_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_routes() -> usize {
    DEFAULT_CAPACITY
}

fn default_read_timeout_ms() -> u64 {
    5_000
}

fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}

fn default_store_size() -> usize {
    1024
}

fn default_clock_enabled() -> bool {
    true
}

fn default_clock_server() -> String {
    "time.nist.gov:123".to_string()
}

fn default_clock_timeout_ms() -> u64 {
    2_000
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_routes: default_max_routes(),
            read_timeout_ms: default_read_timeout_ms(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: default_store_size(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            enabled: default_clock_enabled(),
            server: default_clock_server(),
            timeout_ms: default_clock_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            handler: HandlerConfig::default(),
            store: StoreConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl HandlerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl ClockConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Loads the file named by `PATHWIRE_CONFIG` (if any), then applies
    /// `LISTEN`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(listen) = std::env::var(LISTEN_ENV) {
            cfg.listen_addr = listen;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_yaml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.handler.max_routes == 0 {
            return Err(ConfigError::Invalid("handler.max_routes must be at least 1"));
        }
        if self.handler.max_request_bytes == 0 {
            return Err(ConfigError::Invalid("handler.max_request_bytes must be at least 1"));
        }
        if self.handler.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("handler.read_timeout_ms must be at least 1"));
        }
        Ok(())
    }
}
