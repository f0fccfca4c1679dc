//! CLI argument parsing for wanguard-exporter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: WANGUARD_CONFIG)
//! - `--listen-address`: Address to listen on (env: WANGUARD_LISTEN_ADDRESS)
//! - `--metrics-path`: Metrics endpoint path (env: WANGUARD_METRICS_PATH)
//! - `--api-address`: WANGuard API address (env: WANGUARD_API_ADDRESS)
//! - `--api-username`: API username (env: WANGUARD_USERNAME)
//! - `--api-password`: API password (env: WANGUARD_PASSWORD)
//! - `--api-insecure`: Allow plain HTTP for remote API hosts
//! - `--api-insecure-skip-verify`: Skip TLS certificate verification
//! - `--collector-announcements` / `--collector-firewall-rules`: enable flags
//! - `--validate`: Validate configuration without starting server
//! - `--log-level` / `-l`: Log level (env: WANGUARD_LOG_LEVEL)
//! - `--log-format`: Log output format (text/json)
//!
//! # Precedence
//!
//! Configuration values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, Secret};

/// wanguard-exporter - Prometheus exporter for WANGuard
///
/// Polls the WANGuard HTTP API and exposes the results in Prometheus format.
#[derive(Parser, Debug)]
#[command(name = "wanguard-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "WANGUARD_CONFIG"
    )]
    pub config: PathBuf,

    /// Address to listen on for HTTP requests, `host:port` or `:port`
    #[arg(long, value_name = "ADDRESS", env = "WANGUARD_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which metrics are exposed
    #[arg(long, value_name = "PATH", env = "WANGUARD_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// WANGuard API address
    #[arg(long, value_name = "URL", env = "WANGUARD_API_ADDRESS")]
    pub api_address: Option<String>,

    /// WANGuard API username
    #[arg(long, value_name = "USERNAME", env = "WANGUARD_USERNAME")]
    pub api_username: Option<String>,

    /// WANGuard API password
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "WANGUARD_PASSWORD",
        hide_env_values = true
    )]
    pub api_password: Option<String>,

    /// Allow plain HTTP for remote API hosts
    #[arg(long)]
    pub api_insecure: bool,

    /// Skip TLS certificate verification of the API server
    #[arg(long)]
    pub api_insecure_skip_verify: bool,

    /// Expose announcements metrics
    #[arg(long, value_name = "BOOL")]
    pub collector_announcements: Option<bool>,

    /// Expose firewall rules metrics
    #[arg(long, value_name = "BOOL")]
    pub collector_firewall_rules: Option<bool>,

    /// Validate configuration without starting server
    #[arg(long)]
    pub validate: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "WANGUARD_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Overlay command-line and environment values onto a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(addr) = &self.listen_address {
            config.server.listen_address = addr.clone();
        }
        if let Some(path) = &self.metrics_path {
            config.server.metrics_path = path.clone();
        }
        if let Some(address) = &self.api_address {
            config.api.address = address.clone();
        }
        if let Some(username) = &self.api_username {
            config.api.username = username.clone();
        }
        if let Some(password) = &self.api_password {
            config.api.password = Some(Secret::new(password.clone()));
        }
        if self.api_insecure {
            config.api.insecure = true;
        }
        if self.api_insecure_skip_verify {
            config.api.insecure_skip_verify = true;
        }
        if let Some(enabled) = self.collector_announcements {
            config.collectors.announcements = enabled;
        }
        if let Some(enabled) = self.collector_firewall_rules {
            config.collectors.firewall_rules = enabled;
        }
    }
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_cli_with_options() {
        let cli = Cli::parse_from([
            "wanguard-exporter",
            "-c",
            "custom.yaml",
            "--listen-address",
            "127.0.0.1:9100",
            "--api-address",
            "https://wanguard.example.com",
            "--api-username",
            "monitor",
            "--api-insecure",
            "--collector-firewall-rules",
            "false",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--validate",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        assert_eq!(cli.listen_address.as_deref(), Some("127.0.0.1:9100"));
        assert_eq!(cli.api_username.as_deref(), Some("monitor"));
        assert!(cli.api_insecure);
        assert!(!cli.api_insecure_skip_verify);
        assert_eq!(cli.collector_firewall_rules, Some(false));
        assert_eq!(cli.collector_announcements, None);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.validate);
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::parse_from([
            "wanguard-exporter",
            "--metrics-path",
            "/wg-metrics",
            "--api-password",
            "from-cli",
            "--api-insecure-skip-verify",
            "--collector-announcements",
            "false",
        ]);

        let mut config = Config::default();
        config.api.password = Some(Secret::new("from-file"));
        cli.apply(&mut config);

        assert_eq!(config.server.metrics_path, "/wg-metrics");
        assert_eq!(
            config.api.password.as_ref().map(Secret::expose),
            Some("from-cli")
        );
        assert!(config.api.insecure_skip_verify);
        assert!(!config.api.insecure);
        assert!(!config.collectors.announcements);
        assert!(config.collectors.firewall_rules);
    }

    #[test]
    fn test_apply_keeps_unset_values() {
        let cli = Cli::parse_from(["wanguard-exporter", "--api-address", "https://wg"]);
        let mut config = Config::default();
        config.server.listen_address = "127.0.0.1:1234".to_string();
        cli.apply(&mut config);

        assert_eq!(config.api.address, "https://wg");
        assert_eq!(config.server.listen_address, "127.0.0.1:1234");
    }
}
