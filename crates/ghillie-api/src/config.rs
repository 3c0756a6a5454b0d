//! HTTP server configuration, following `ServiceConfig`'s env-driven
//! shape: explicit `from_env()` plus a `validate()` run once at startup.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    /// Reads `GHILLIE_HOST`/`GHILLIE_PORT`, falling back to defaults when
    /// unset. An out-of-range port is a validation error, not a parse
    /// error, so the caller can report it alongside other config issues.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("GHILLIE_HOST") {
            if !host.trim().is_empty() {
                config.host = host;
            }
        }

        if let Ok(port) = std::env::var("GHILLIE_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Invalid {
                message: format!("GHILLIE_PORT '{port}' is not a valid port number"),
            })?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                message: "GHILLIE_PORT must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
