//! Configuration loading: TOML file with environment variable overrides.
//!
//! Reads `neohub.toml` (or the path given on the command line). Every field
//! has a default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use neohub_adapter_http_axum::HttpConfig;
use neohub_adapter_store_toml::StoreConfig;
use neohub_adapter_tcp::ClientConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub discovery, connection and polling.
    pub hub: ClientConfig,
    /// Metrics and API listener.
    pub http: HttpConfig,
    /// Persisted hub address.
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "neohubd=info,neohub=info".to_string(),
        }
    }
}

impl Config {
    /// Load `path` (if present), apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("NEOHUB_ADDRESS") {
            self.hub.address = Some(val);
        }
        if let Some(port) = var("NEOHUB_PORT").and_then(|val| val.parse().ok()) {
            self.hub.connection.port = port;
        }
        if let Some(val) = var("NEOHUB_METRICS_BIND") {
            self.http.bind = val;
        }
        if let Some(val) = var("NEOHUB_STORE_PATH") {
            self.store.path = PathBuf::from(val);
        }
        if let Some(val) = var("NEOHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ports = [
            ("hub.connection.port", self.hub.connection.port),
            ("hub.discovery.broadcast_port", self.hub.discovery.broadcast_port),
        ];
        for (name, port) in ports {
            if port == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        let intervals = [
            ("hub.poll_interval_secs", self.hub.poll_interval_secs),
            ("hub.connection.keep_alive_secs", self.hub.connection.keep_alive_secs),
            ("hub.connection.recv_timeout_secs", self.hub.connection.recv_timeout_secs),
            (
                "hub.connection.connect_timeout_secs",
                self.hub.connection.connect_timeout_secs,
            ),
            (
                "hub.discovery.probe_interval_secs",
                self.hub.discovery.probe_interval_secs,
            ),
            ("hub.discovery.timeout_secs", self.hub.discovery.timeout_secs),
        ];
        for (name, secs) in intervals {
            if secs == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
