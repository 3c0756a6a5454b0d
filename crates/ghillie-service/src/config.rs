//! Environment-driven process configuration: everything needed to
//! construct the database pool, the GitHub source client, the status
//! model, and the HTTP server, following `ghillie-api::config`'s
//! `from_env()`/`validate()` shape.

use std::path::PathBuf;

use ghillie_api::config::ServerConfig;
use ghillie_core::status::OpenAiStatusModelConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<ghillie_api::errors::ConfigError> for ConfigError {
    fn from(err: ghillie_api::errors::ConfigError) -> Self {
        let ghillie_api::errors::ConfigError::Invalid { message } = err;
        ConfigError::Invalid { message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusModelBackend {
    Mock,
    OpenAi,
}

impl StatusModelBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::Invalid {
                message: format!(
                    "GHILLIE_STATUS_MODEL_BACKEND '{other}' must be 'mock' or 'openai'"
                ),
            }),
        }
    }
}

/// Valid tracing directive a caller asked for, plus the raw input when
/// it didn't match one of the accepted spellings (so the caller can
/// warn about the fallback to INFO once logging is initialized).
pub fn resolve_log_level(raw: Option<String>) -> (String, Option<String>) {
    let Some(raw) = raw else {
        return ("INFO".to_string(), None);
    };
    match raw.trim().to_uppercase().as_str() {
        level @ ("TRACE" | "DEBUG" | "INFO" | "WARN" | "ERROR") => (level.to_string(), None),
        "WARNING" => ("WARN".to_string(), None),
        "CRITICAL" => ("ERROR".to_string(), None),
        other => ("INFO".to_string(), Some(other.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: Option<String>,
    pub server: ServerConfig,
    pub log_level: String,
    pub log_level_fallback_from: Option<String>,
    pub github_token: Option<String>,
    pub status_model_backend: Option<StatusModelBackend>,
    pub openai: OpenAiStatusModelConfig,
    pub reporting_window_days: i64,
    pub report_sink_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = non_empty_env("GHILLIE_DATABASE_URL");
        let server = ServerConfig::from_env()?;
        let (log_level, log_level_fallback_from) =
            resolve_log_level(std::env::var("GHILLIE_LOG_LEVEL").ok());
        let github_token = non_empty_env("GHILLIE_GITHUB_TOKEN");

        let status_model_backend = std::env::var("GHILLIE_STATUS_MODEL_BACKEND")
            .ok()
            .map(|raw| StatusModelBackend::parse(&raw))
            .transpose()?;

        let mut openai = OpenAiStatusModelConfig::default();
        if let Some(key) = non_empty_env("GHILLIE_OPENAI_API_KEY") {
            openai.api_key = key;
        }
        if let Some(endpoint) = non_empty_env("GHILLIE_OPENAI_ENDPOINT") {
            openai.endpoint = endpoint;
        }
        if let Some(model) = non_empty_env("GHILLIE_OPENAI_MODEL") {
            openai.model = model;
        }
        if let Ok(temperature) = std::env::var("GHILLIE_OPENAI_TEMPERATURE") {
            openai.temperature = temperature.parse().map_err(|_| ConfigError::Invalid {
                message: format!("GHILLIE_OPENAI_TEMPERATURE '{temperature}' is not a number"),
            })?;
        }
        if let Ok(max_tokens) = std::env::var("GHILLIE_OPENAI_MAX_TOKENS") {
            openai.max_tokens = max_tokens.parse().map_err(|_| ConfigError::Invalid {
                message: format!("GHILLIE_OPENAI_MAX_TOKENS '{max_tokens}' is not an integer"),
            })?;
        }

        let reporting_window_days = std::env::var("GHILLIE_REPORTING_WINDOW_DAYS")
            .ok()
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| ConfigError::Invalid {
                    message: format!("GHILLIE_REPORTING_WINDOW_DAYS '{raw}' is not an integer"),
                })
            })
            .transpose()?
            .unwrap_or(7);

        let report_sink_path = non_empty_env("GHILLIE_REPORT_SINK_PATH").map(PathBuf::from);

        Ok(Self {
            database_url,
            server,
            log_level,
            log_level_fallback_from,
            github_token,
            status_model_backend,
            openai,
            reporting_window_days,
            report_sink_path,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;

        if self.database_url.is_some() && self.status_model_backend.is_none() {
            return Err(ConfigError::Invalid {
                message: "GHILLIE_STATUS_MODEL_BACKEND must be set when GHILLIE_DATABASE_URL is configured".to_string(),
            });
        }

        if self.status_model_backend == Some(StatusModelBackend::OpenAi) {
            self.openai
                .validate()
                .map_err(|e| ConfigError::Invalid { message: e.to_string() })?;
        }

        if self.reporting_window_days <= 0 {
            return Err(ConfigError::Invalid {
                message: "GHILLIE_REPORTING_WINDOW_DAYS must be positive".to_string(),
            });
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
