//! Binary entry point for the Ghillie HTTP service.
//!
//! Loads configuration from the environment, initializes tracing, and
//! starts the HTTP server (health probes, on-demand reporting). Running
//! ingestion sweeps is the `ghillie-cli ingest` command's job, not this
//! binary's.

use ghillie_service::ServiceConfig;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "ghillie_service={level},ghillie_api={level},ghillie_core={level},ghillie_github={level}",
            level = config.log_level.to_lowercase()
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(invalid) = &config.log_level_fallback_from {
        warn!(invalid_value = %invalid, "GHILLIE_LOG_LEVEL was not recognised, falling back to INFO");
    }

    if let Err(err) = config.validate() {
        error!(error = %err, "configuration validation failed");
        std::process::exit(1);
    }

    if let Err(err) = ghillie_service::run_serve(&config).await {
        error!(error = %err, "ghillie-service exited with an error");
        std::process::exit(1);
    }
}
