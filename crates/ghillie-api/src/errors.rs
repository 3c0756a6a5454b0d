//! Error types for the HTTP service, with HTTP status code mapping
//! for each failure mode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ghillie_core::reporting::ReportingError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },
    #[error("server failed: {message}")]
    ServerFailed { message: String },
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Errors surfaced by `POST /reports/repositories/{owner}/{name}`, mapped
/// to the status codes `spec.md` §6 documents for that endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ReportRequestError {
    #[error("repository '{owner}/{name}' is not known to the catalogue")]
    RepositoryNotFound { owner: String, name: String },
    #[error("report generation failed: {0}")]
    Reporting(#[from] ReportingError),
}

impl IntoResponse for ReportRequestError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            Self::RepositoryNotFound { .. } => (StatusCode::NOT_FOUND, "repository_not_found"),
            Self::Reporting(err) if err.is_transient() => {
                (StatusCode::SERVICE_UNAVAILABLE, "reporting_transient_failure")
            }
            Self::Reporting(_) => (StatusCode::INTERNAL_SERVER_ERROR, "reporting_failed"),
        };

        if status.is_server_error() {
            error!(error = %self, "report request failed");
        }

        let body = serde_json::json!({
            "title": title,
            "description": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
