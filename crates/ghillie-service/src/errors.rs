//! Errors surfaced by process wiring: configuration, database
//! connectivity, and the source client / status model backends it
//! constructs from configuration.

use ghillie_core::reporting::ReportingError;
use ghillie_core::status::StatusModelError;
use ghillie_github::{GitHubClientError, IngestionError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("GitHub client error: {0}")]
    GitHubClient(#[from] GitHubClientError),
    #[error("ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),
    #[error("status model error: {0}")]
    StatusModel(#[from] StatusModelError),
    #[error("reporting failed: {0}")]
    Reporting(#[from] ReportingError),
    #[error("'{owner}/{name}' is not a known repository")]
    RepositoryNotFound { owner: String, name: String },
    #[error("repository must be given as 'owner/name', got '{raw}'")]
    MalformedRepositorySlug { raw: String },
    #[error("HTTP server error: {0}")]
    Api(#[from] ghillie_api::errors::ServiceError),
}

/// Splits `"owner/name"` into its parts, the shape both the HTTP surface
/// and the CLI address a repository by.
pub fn split_repository_slug(raw: &str) -> Result<(String, String), ServiceError> {
    match raw.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(ServiceError::MalformedRepositorySlug {
            raw: raw.to_string(),
        }),
    }
}
