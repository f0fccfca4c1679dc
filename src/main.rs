//! wanguard-exporter - Prometheus exporter for WANGuard
//!
//! This binary serves a Prometheus-compatible metrics endpoint backed by the
//! WANGuard HTTP API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use wanguard_exporter::cli::Cli;
use wanguard_exporter::config::Config;
use wanguard_exporter::error::AppResult;
use wanguard_exporter::{build_client, build_registry, server};

/// Load, merge and validate configuration
fn load_config(cli: &Cli) -> AppResult<Config> {
    let mut config = Config::load_or_default(&cli.config)?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    wanguard_exporter::init_logging(&cli.log_level.to_string(), cli.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting wanguard-exporter"
    );

    let config = load_config(&cli)?;
    let client = Arc::new(build_client(&config.api)?);
    let registry = build_registry(Arc::clone(&client), &config.collectors)?;

    if cli.validate {
        println!("Configuration is valid");
        println!("  API address: {}", client.target().address());
        println!("  Collectors: {}", registry.collector_names().join(", "));
        return Ok(());
    }

    let addr = config.server.socket_addr()?;
    server::run(Arc::new(registry), addr, &config.server.metrics_path).await?;

    Ok(())
}
