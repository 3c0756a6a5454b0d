//! The source-client trait consumed by the ingestion worker, modeled on
//! `github-bot-sdk`'s client abstraction but adapted to a streaming
//! contract: a lazy, cursor-tagged sequence of events ordered most-recent
//! first, bounded by a `since` timestamp and optionally resumed from an
//! `after` cursor.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use ghillie_core::ErrorCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIngestedEvent {
    pub event_type: String,
    pub source_event_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub cursor: String,
}

#[derive(Debug, Error)]
pub enum GitHubClientError {
    #[error("GitHub API returned HTTP {status}")]
    HttpError { status: u16 },
    #[error("GitHub GraphQL response carried errors: {messages:?}")]
    GraphqlErrors { messages: Vec<String> },
    #[error("GitHub response missing expected field: {field}")]
    ResponseShape { field: String },
    #[error("GitHub client misconfigured: {message}")]
    Config { message: String },
}

impl GitHubClientError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::HttpError { status } if *status >= 500 || *status == 429 => ErrorCategory::Transient,
            Self::HttpError { .. } => ErrorCategory::ClientError,
            Self::GraphqlErrors { .. } => ErrorCategory::ClientError,
            Self::ResponseShape { .. } => ErrorCategory::SchemaDrift,
            Self::Config { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.error_category(), ErrorCategory::Transient)
    }
}

/// Implemented once per external source-control system; GitHub is the
/// only concrete implementation Ghillie ships today
/// ([`crate::graphql::GitHubGraphQlClient`]).
pub trait GitHubActivityClient: Send + Sync {
    fn stream_commits<'a>(
        &'a self,
        repo_slug: &'a str,
        default_branch: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>>;

    fn stream_pull_requests<'a>(
        &'a self,
        repo_slug: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>>;

    fn stream_issues<'a>(
        &'a self,
        repo_slug: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>>;

    fn stream_doc_changes<'a>(
        &'a self,
        repo_slug: &'a str,
        default_branch: &'a str,
        documentation_paths: &'a [String],
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>>;
}
