//! wanguard-exporter library
//!
//! This crate polls the WANGuard HTTP API and exposes selected values in
//! Prometheus format.

pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;
use crate::client::{ApiClient, Target};
use crate::collector::{
    AnnouncementsCollector, ApiUpCollector, FirewallRulesCollector, ProcessCollector, Registry,
};
use crate::config::{ApiConfig, CollectorsConfig, ConfigError};
use crate::error::RegistryError;

/// Initialize the logging subsystem
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
/// * `format` - Text or JSON lines, written to stderr
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Validate the API section and build the shared client
///
/// # Errors
/// Returns `ConfigError` for a missing password or a rejected address
pub fn build_client(api: &ApiConfig) -> Result<ApiClient, ConfigError> {
    let password = api.password.clone().ok_or(ConfigError::MissingPassword)?;
    let target = Target::new(&api.address, &api.username, password, api.insecure)?
        .with_skip_verify(api.insecure_skip_verify);

    ApiClient::new(target)
}

/// Register the availability gauge, process metrics and every enabled
/// collector
///
/// # Errors
/// Returns `RegistryError` if descriptors collide
pub fn build_registry(
    client: Arc<ApiClient>,
    collectors: &CollectorsConfig,
) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    registry.register(ApiUpCollector::new(client.availability().clone()), true)?;
    registry.register(ProcessCollector::new(), true)?;
    registry.register(
        AnnouncementsCollector::new(Arc::clone(&client)),
        collectors.announcements,
    )?;
    registry.register(
        FirewallRulesCollector::new(Arc::clone(&client)),
        collectors.firewall_rules,
    )?;

    Ok(registry)
}
