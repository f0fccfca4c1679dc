//! Configuration management for wanguard-exporter
//!
//! Handles loading and validating configuration from YAML files. Command-line
//! flags and environment variables are layered on top in [`crate::cli`].

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// API password not provided by any source
    #[error("API password is not set; use --api-password, the api.password config key or the WANGUARD_PASSWORD environment variable")]
    MissingPassword,

    /// API address rejected
    #[error("Invalid API address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// HTTP client could not be constructed
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(String),
}

/// String that never shows up in logs or debug output
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// WANGuard API target
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-collector enable flags
    #[serde(default)]
    pub collectors: CollectorsConfig,
}

/// WANGuard API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API base address
    #[serde(default = "default_api_address")]
    pub address: String,

    /// Basic auth username
    #[serde(default = "default_api_username")]
    pub username: String,

    /// Basic auth password
    #[serde(default)]
    pub password: Option<Secret>,

    /// Allow plain HTTP for remote hosts
    #[serde(default)]
    pub insecure: bool,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port` or `:port`
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

/// Collector enable flags
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorsConfig {
    #[serde(default = "default_true")]
    pub announcements: bool,

    #[serde(default = "default_true")]
    pub firewall_rules: bool,
}

// Default value functions
fn default_api_address() -> String {
    "http://127.0.0.1:81".to_string()
}

fn default_api_username() -> String {
    "admin".to_string()
}

fn default_listen_address() -> String {
    ":9868".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: default_api_address(),
            username: default_api_username(),
            password: None,
            insecure: false,
            insecure_skip_verify: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            announcements: true,
            firewall_rules: true,
        }
    }
}

impl ServerConfig {
    /// Parse the listen address; `:port` binds all interfaces
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        };

        addr.parse().map_err(|e| {
            ConfigError::ValidationError(format!(
                "Invalid listen address '{}': {}",
                self.listen_address, e
            ))
        })
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed. Validation is
    /// deferred until command-line overrides have been applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Validate the fully merged configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.api.password {
            Some(p) if !p.is_empty() => {}
            _ => return Err(ConfigError::MissingPassword),
        }

        let path = &self.server.metrics_path;
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }
        if path == "/" || path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                path
            )));
        }

        self.server.socket_addr()?;

        Ok(())
    }
}
