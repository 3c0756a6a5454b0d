//! Command-line interface for Ghillie.
//!
//! Thin wrapper around `ghillie-service`: parses arguments, builds a
//! [`ServiceConfig`] from the environment, and dispatches to the
//! `serve`/`ingest`/`report`/`config check` entry points.

use clap::{Parser, Subcommand};
use ghillie_service::{ServiceConfig, ServiceError};
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ghillie CLI - GitHub repository activity observability.
#[derive(Parser)]
#[command(name = "ghillie")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bronze/Silver/Gold pipeline for GitHub repository activity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (health probes, on-demand reporting).
    Serve,

    /// Run an ingestion sweep for one repository, or all enabled ones.
    Ingest {
        /// Repository to ingest, as `owner/name`. Ingests every
        /// ingestion-enabled repository in the catalogue when omitted.
        repository: Option<String>,
    },

    /// Generate a report for a single repository.
    Report {
        /// Repository to report on, as `owner/name`.
        repository: String,
    },

    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Load configuration from the environment and validate it, printing
    /// the outcome without starting anything.
    Check,
}

/// CLI-specific errors, each mapped to a distinct process exit code in
/// [`exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Maps a [`CliError`] to the process exit code `main` should use.
pub fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Configuration(_) => 1,
        CliError::Service(_) => 2,
    }
}

fn init_logging(config: &ServiceConfig) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "ghillie_cli={level},ghillie_service={level},ghillie_api={level},ghillie_core={level},ghillie_github={level}",
            level = config.log_level.to_lowercase()
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(invalid) = &config.log_level_fallback_from {
        warn!(invalid_value = %invalid, "GHILLIE_LOG_LEVEL was not recognised, falling back to INFO");
    }
}

pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = ServiceConfig::from_env().map_err(|e| CliError::Configuration(e.to_string()))?;

    if let Commands::Config {
        action: ConfigCommands::Check,
    } = cli.command
    {
        return run_config_check(&config);
    }

    init_logging(&config);
    config
        .validate()
        .map_err(|e| CliError::Configuration(e.to_string()))?;

    match cli.command {
        Commands::Serve => ghillie_service::run_serve(&config).await?,
        Commands::Ingest { repository } => {
            ghillie_service::run_ingest(&config, repository.as_deref()).await?
        }
        Commands::Report { repository } => {
            ghillie_service::run_report(&config, &repository).await?
        }
        Commands::Config { .. } => unreachable!("config check handled above"),
    }

    Ok(())
}

fn run_config_check(config: &ServiceConfig) -> Result<(), CliError> {
    match config.validate() {
        Ok(()) => {
            println!("configuration is valid");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "configuration validation failed");
            Err(CliError::Configuration(err.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
