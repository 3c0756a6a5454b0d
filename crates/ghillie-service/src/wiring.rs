//! Builds the concrete dependency graph from a [`ServiceConfig`]: the
//! database pool, the GitHub source client, the status model backend,
//! and the reporting/ingestion services that sit on top of them.

use std::sync::Arc;

use chrono::Duration;
use ghillie_api::{AppState, ApiMetrics};
use ghillie_core::adapters::{PostgresStore, PostgresStoreConfig};
use ghillie_core::catalogue::CatalogueStore;
use ghillie_core::reporting::{FilesystemReportSink, ReportSink, ReportingService};
use ghillie_core::status::{MockStatusModel, OpenAiStatusModel, StatusModel};
use ghillie_github::{
    GitHubActivityClient, GitHubGraphQlClient, GitHubGraphQlConfig, GitHubIngestionConfig,
    GitHubIngestionWorker,
};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::{ServiceConfig, StatusModelBackend};
use crate::errors::ServiceError;

pub async fn connect_database(database_url: &str) -> Result<PgPool, ServiceError> {
    let store = PostgresStore::connect(&PostgresStoreConfig {
        database_url: database_url.to_string(),
        ..Default::default()
    })
    .await?;
    store.migrate().await?;
    Ok(store.pool().clone())
}

pub fn build_status_model(config: &ServiceConfig) -> Result<Arc<dyn StatusModel>, ServiceError> {
    match config.status_model_backend {
        Some(StatusModelBackend::Mock) | None => Ok(Arc::new(MockStatusModel::new())),
        Some(StatusModelBackend::OpenAi) => {
            Ok(Arc::new(OpenAiStatusModel::new(config.openai.clone())?))
        }
    }
}

fn build_report_sink(config: &ServiceConfig) -> Option<Arc<dyn ReportSink>> {
    config
        .report_sink_path
        .clone()
        .map(|path| Arc::new(FilesystemReportSink::new(path)) as Arc<dyn ReportSink>)
}

pub fn build_reporting_service(
    config: &ServiceConfig,
    pool: PgPool,
) -> Result<ReportingService, ServiceError> {
    let status_model = build_status_model(config)?;
    let sink = build_report_sink(config);
    Ok(
        ReportingService::new(pool, status_model, sink)
            .with_initial_window(Duration::days(config.reporting_window_days)),
    )
}

pub fn build_github_client() -> Result<Arc<dyn GitHubActivityClient>, ServiceError> {
    let config = GitHubGraphQlConfig::from_env()?;
    Ok(Arc::new(GitHubGraphQlClient::new(config)?))
}

pub fn build_ingestion_worker(pool: PgPool) -> Result<GitHubIngestionWorker, ServiceError> {
    let client = build_github_client()?;
    Ok(GitHubIngestionWorker::new(
        pool,
        client,
        GitHubIngestionConfig::default(),
    ))
}

/// Builds the HTTP application state: health-only when no database is
/// configured, full reporting capability otherwise.
pub async fn build_app_state(config: &ServiceConfig) -> Result<AppState, ServiceError> {
    let metrics = Arc::new(ApiMetrics::new().map_err(|e| {
        ServiceError::Configuration(crate::config::ConfigError::Invalid {
            message: format!("failed to register metrics: {e}"),
        })
    })?);

    let Some(database_url) = &config.database_url else {
        info!("GHILLIE_DATABASE_URL not set, starting in health-only mode");
        return Ok(AppState::health_only(metrics));
    };

    let pool = connect_database(database_url).await?;
    let reporting = Arc::new(build_reporting_service(config, pool.clone())?);
    Ok(AppState::with_database(pool, reporting, metrics))
}

/// One ingestion sweep: every ingestion-enabled repository, or a single
/// one when `repository` names an `owner/name` slug.
pub async fn run_ingest(config: &ServiceConfig, repository: Option<&str>) -> Result<(), ServiceError> {
    let database_url = config
        .database_url
        .as_ref()
        .ok_or_else(|| ServiceError::Configuration(crate::config::ConfigError::Invalid {
            message: "GHILLIE_DATABASE_URL is required for ingestion".to_string(),
        }))?;

    let pool = connect_database(database_url).await?;
    let catalogue = CatalogueStore::new(pool.clone());
    let worker = build_ingestion_worker(pool)?;

    let repos = match repository {
        Some(slug) => {
            let (owner, name) = crate::errors::split_repository_slug(slug)?;
            let repo = catalogue
                .get_repository_by_owner_and_name(&owner, &name)
                .await?
                .ok_or(ServiceError::RepositoryNotFound { owner, name })?;
            vec![repo]
        }
        None => catalogue.list_ingestion_enabled_repositories().await?,
    };

    for repo in &repos {
        let slug = format!("{}/{}", repo.owner, repo.name);
        match worker.ingest_repository(repo).await {
            Ok(outcome) => info!(
                repo_slug = %slug,
                commits = outcome.commits_ingested,
                pull_requests = outcome.pull_requests_ingested,
                issues = outcome.issues_ingested,
                doc_changes = outcome.doc_changes_ingested,
                "ingestion run completed"
            ),
            Err(err) => warn!(repo_slug = %slug, error = %err, "ingestion run failed"),
        }
    }

    Ok(())
}

/// One on-demand report for a single `owner/name` repository.
pub async fn run_report(config: &ServiceConfig, repository: &str) -> Result<(), ServiceError> {
    let database_url = config
        .database_url
        .as_ref()
        .ok_or_else(|| ServiceError::Configuration(crate::config::ConfigError::Invalid {
            message: "GHILLIE_DATABASE_URL is required for reporting".to_string(),
        }))?;

    let (owner, name) = crate::errors::split_repository_slug(repository)?;
    let pool = connect_database(database_url).await?;
    let catalogue = CatalogueStore::new(pool.clone());
    let repo = catalogue
        .get_repository_by_owner_and_name(&owner, &name)
        .await?
        .ok_or(ServiceError::RepositoryNotFound { owner, name })?;

    let reporting = build_reporting_service(config, pool)?;
    match reporting.run_for_repository(&repo.external_id).await? {
        Some(outcome) => info!(
            repo_slug = %repository,
            report_id = %outcome.report_id,
            model = %outcome.model,
            "generated report"
        ),
        None => info!(repo_slug = %repository, "no events in window, no report generated"),
    }

    Ok(())
}

pub async fn run_serve(config: &ServiceConfig) -> Result<(), ServiceError> {
    let state = build_app_state(config).await?;
    ghillie_api::start_server(&config.server, Arc::new(state))
        .await
        .map_err(ServiceError::Api)
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
