//! Configuration Module
//!
//! Handles app construction options and loading server configuration from
//! environment variables.

use std::env;

use serde_json::{Map, Value};

use crate::cache::{CacheCapability, CacheOption, DEFAULT_MAX_INSTANCES};

// == App Config ==
/// Options recognised when constructing an [`App`](crate::App).
#[derive(Debug)]
pub struct AppConfig {
    /// Instance cache capacity, or an external backend
    pub cache: CacheOption,
    /// Treat `#` in paths as a segment separator (otherwise drop the fragment)
    pub hash: bool,
    /// Install history listeners on `start`
    pub history: bool,
    /// Initial shared application fields
    pub state: Map<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache: CacheOption::default(),
            hash: true,
            history: true,
            state: Map::new(),
        }
    }
}

impl AppConfig {
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = CacheOption::Capacity(capacity);
        self
    }

    pub fn cache_backend(mut self, backend: impl CacheCapability + 'static) -> Self {
        self.cache = CacheOption::custom(backend);
        self
    }

    pub fn hash(mut self, enabled: bool) -> Self {
        self.hash = enabled;
        self
    }

    pub fn history(mut self, enabled: bool) -> Self {
        self.history = enabled;
        self
    }

    /// Seeds a shared application field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached component instances
    pub cache_size: usize,
    /// Hash routing
    pub hash: bool,
    /// History listeners
    pub history: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SIZE` - Maximum cached instances (default: 100)
    /// - `HASH_ROUTING` - Treat `#` as a path separator (default: true)
    /// - `HISTORY` - Install history listeners (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_size: env::var("CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_size),
            hash: env::var("HASH_ROUTING")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.hash),
            history: env::var("HISTORY")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.history),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// The app construction options this server configuration implies.
    pub fn app_config(&self) -> AppConfig {
        AppConfig::default()
            .cache_capacity(self.cache_size)
            .hash(self.hash)
            .history(self.history)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_MAX_INSTANCES,
            hash: true,
            history: true,
            server_port: 3000,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
