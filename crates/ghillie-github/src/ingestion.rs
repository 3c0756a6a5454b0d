//! The ingestion worker: drives a [`GitHubActivityClient`] across commits,
//! pull requests, issues, and documentation changes for one repository,
//! tracking a watermark/cursor pair per kind so interrupted runs resume
//! without re-ingesting or skipping events.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use ghillie_core::bronze::{BronzeError, RawEventEnvelope, RawEventWriter};
use ghillie_core::catalogue::RepositoryInfo;
use ghillie_core::errors::{categorize_sqlx_error, ErrorCategory};

use crate::client::{GitHubActivityClient, GitHubClientError, GitHubIngestedEvent};
use crate::noise::CompiledNoiseFilters;

#[derive(Debug, Clone)]
pub struct GitHubIngestionConfig {
    pub initial_lookback: Duration,
    pub overlap: Duration,
    pub max_events_per_kind: usize,
}

impl Default for GitHubIngestionConfig {
    fn default() -> Self {
        Self {
            initial_lookback: Duration::days(7),
            overlap: Duration::minutes(5),
            max_events_per_kind: 500,
        }
    }
}

/// Per-repository tally for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionRunOutcome {
    pub repo_slug: String,
    pub commits_ingested: usize,
    pub pull_requests_ingested: usize,
    pub issues_ingested: usize,
    pub doc_changes_ingested: usize,
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("source client failed: {0}")]
    Client(#[from] GitHubClientError),
    #[error("writing a raw event failed: {0}")]
    Bronze(#[from] BronzeError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestionError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            IngestionError::Client(err) => err.error_category(),
            IngestionError::Bronze(err) => err.error_category(),
            IngestionError::Database(err) => categorize_sqlx_error(err),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self.error_category(),
            ErrorCategory::Transient | ErrorCategory::DatabaseConnectivity
        )
    }
}

#[derive(sqlx::FromRow)]
struct OffsetsRow {
    last_commit_ingested_at: Option<DateTime<Utc>>,
    last_commit_seen_at: Option<DateTime<Utc>>,
    last_commit_cursor: Option<String>,
    last_pr_ingested_at: Option<DateTime<Utc>>,
    last_pr_seen_at: Option<DateTime<Utc>>,
    last_pr_cursor: Option<String>,
    last_issue_ingested_at: Option<DateTime<Utc>>,
    last_issue_seen_at: Option<DateTime<Utc>>,
    last_issue_cursor: Option<String>,
    last_doc_ingested_at: Option<DateTime<Utc>>,
    last_doc_seen_at: Option<DateTime<Utc>>,
    last_doc_cursor: Option<String>,
}

impl Default for OffsetsRow {
    fn default() -> Self {
        Self {
            last_commit_ingested_at: None,
            last_commit_seen_at: None,
            last_commit_cursor: None,
            last_pr_ingested_at: None,
            last_pr_seen_at: None,
            last_pr_cursor: None,
            last_issue_ingested_at: None,
            last_issue_seen_at: None,
            last_issue_cursor: None,
            last_doc_ingested_at: None,
            last_doc_seen_at: None,
            last_doc_cursor: None,
        }
    }
}

/// The outcome of draining one event stream up to the configured limit.
struct StreamIngestionResult {
    ingested: usize,
    max_seen: Option<DateTime<Utc>>,
    resume_cursor: Option<String>,
    truncated: bool,
}

pub struct GitHubIngestionWorker {
    pool: PgPool,
    client: Arc<dyn GitHubActivityClient>,
    writer: RawEventWriter,
    config: GitHubIngestionConfig,
}

impl GitHubIngestionWorker {
    pub fn new(pool: PgPool, client: Arc<dyn GitHubActivityClient>, config: GitHubIngestionConfig) -> Self {
        let writer = RawEventWriter::new(pool.clone());
        Self {
            pool,
            client,
            writer,
            config,
        }
    }

    /// A repository with `ingestion_enabled = false` is a no-op: offsets
    /// are neither read nor written.
    pub async fn ingest_repository(
        &self,
        repo: &RepositoryInfo,
    ) -> Result<IngestionRunOutcome, IngestionError> {
        let repo_slug = format!("{}/{}", repo.owner, repo.name);
        let mut outcome = IngestionRunOutcome {
            repo_slug: repo_slug.clone(),
            ..Default::default()
        };

        if !repo.ingestion_enabled {
            return Ok(outcome);
        }

        let mut offsets = self.load_or_create_offsets(&repo.external_id).await?;
        let noise = self.compile_noise_filters(repo).await;
        let now = Utc::now();

        let commit_since = since_for(offsets.last_commit_ingested_at, now, &self.config);
        let commit_result = self
            .drain_stream(
                self.client
                    .stream_commits(&repo_slug, &repo.default_branch, commit_since, offsets.last_commit_cursor.clone()),
                &noise,
                &repo.external_id,
            )
            .await?;
        outcome.commits_ingested = commit_result.ingested;
        apply_kind_result(
            &commit_result,
            offsets.last_commit_cursor.is_some(),
            &mut offsets.last_commit_ingested_at,
            &mut offsets.last_commit_seen_at,
            &mut offsets.last_commit_cursor,
        );
        log_stream_completed("commit", &repo_slug, &commit_result);

        let pr_since = since_for(offsets.last_pr_ingested_at, now, &self.config);
        let pr_result = self
            .drain_stream(
                self.client.stream_pull_requests(&repo_slug, pr_since, offsets.last_pr_cursor.clone()),
                &noise,
                &repo.external_id,
            )
            .await?;
        outcome.pull_requests_ingested = pr_result.ingested;
        apply_kind_result(
            &pr_result,
            offsets.last_pr_cursor.is_some(),
            &mut offsets.last_pr_ingested_at,
            &mut offsets.last_pr_seen_at,
            &mut offsets.last_pr_cursor,
        );
        log_stream_completed("pull_request", &repo_slug, &pr_result);

        let issue_since = since_for(offsets.last_issue_ingested_at, now, &self.config);
        let issue_result = self
            .drain_stream(
                self.client.stream_issues(&repo_slug, issue_since, offsets.last_issue_cursor.clone()),
                &noise,
                &repo.external_id,
            )
            .await?;
        outcome.issues_ingested = issue_result.ingested;
        apply_kind_result(
            &issue_result,
            offsets.last_issue_cursor.is_some(),
            &mut offsets.last_issue_ingested_at,
            &mut offsets.last_issue_seen_at,
            &mut offsets.last_issue_cursor,
        );
        log_stream_completed("issue", &repo_slug, &issue_result);

        if !repo.documentation_paths.is_empty() {
            let doc_since = since_for(offsets.last_doc_ingested_at, now, &self.config);
            let doc_result = self
                .drain_stream(
                    self.client.stream_doc_changes(
                        &repo_slug,
                        &repo.default_branch,
                        &repo.documentation_paths,
                        doc_since,
                        offsets.last_doc_cursor.clone(),
                    ),
                    &noise,
                    &repo.external_id,
                )
                .await?;
            outcome.doc_changes_ingested = doc_result.ingested;
            apply_kind_result(
                &doc_result,
                offsets.last_doc_cursor.is_some(),
                &mut offsets.last_doc_ingested_at,
                &mut offsets.last_doc_seen_at,
                &mut offsets.last_doc_cursor,
            );
            log_stream_completed("doc_change", &repo_slug, &doc_result);
        }

        self.persist_offsets(&repo.external_id, &offsets).await?;

        info!(
            repo_slug,
            commits = outcome.commits_ingested,
            pull_requests = outcome.pull_requests_ingested,
            issues = outcome.issues_ingested,
            doc_changes = outcome.doc_changes_ingested,
            "ingestion run completed"
        );

        Ok(outcome)
    }

    async fn drain_stream(
        &self,
        mut stream: futures::stream::BoxStream<'_, Result<GitHubIngestedEvent, GitHubClientError>>,
        noise: &CompiledNoiseFilters,
        repo_external_id: &str,
    ) -> Result<StreamIngestionResult, IngestionError> {
        let mut ingested = 0usize;
        let mut seen = 0usize;
        let mut max_seen: Option<DateTime<Utc>> = None;
        let mut last_cursor: Option<String> = None;
        let mut truncated = false;

        while let Some(event) = stream.next().await {
            if seen >= self.config.max_events_per_kind {
                truncated = true;
                break;
            }
            let event = event?;
            seen += 1;
            max_seen = Some(match max_seen {
                Some(current) if current >= event.occurred_at => current,
                _ => event.occurred_at,
            });
            last_cursor = Some(event.cursor.clone());

            if noise.should_drop(&event) {
                continue;
            }

            let envelope = RawEventEnvelope {
                source_system: "github".into(),
                event_type: event.event_type,
                source_event_id: event.source_event_id,
                repo_external_id: Some(repo_external_id.to_string()),
                occurred_at: event.occurred_at,
                payload: event.payload,
            };
            self.writer.ingest(envelope).await?;
            ingested += 1;
        }

        Ok(StreamIngestionResult {
            ingested,
            max_seen,
            resume_cursor: if truncated { last_cursor } else { None },
            truncated,
        })
    }

    async fn load_or_create_offsets(&self, repo_external_id: &str) -> Result<OffsetsRow, sqlx::Error> {
        if let Some(row) = self.select_offsets(repo_external_id).await? {
            return Ok(row);
        }

        let inserted = sqlx::query(
            "INSERT INTO github_ingestion_offsets (repo_external_id, updated_at) VALUES ($1, now()) \
             ON CONFLICT (repo_external_id) DO NOTHING",
        )
        .bind(repo_external_id)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            if let Some(row) = self.select_offsets(repo_external_id).await? {
                return Ok(row);
            }
        }

        self.select_offsets(repo_external_id)
            .await?
            .map(Ok)
            .unwrap_or_else(|| Ok(OffsetsRow::default()))
    }

    async fn select_offsets(&self, repo_external_id: &str) -> Result<Option<OffsetsRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT last_commit_ingested_at, last_commit_seen_at, last_commit_cursor,
                   last_pr_ingested_at, last_pr_seen_at, last_pr_cursor,
                   last_issue_ingested_at, last_issue_seen_at, last_issue_cursor,
                   last_doc_ingested_at, last_doc_seen_at, last_doc_cursor
            FROM github_ingestion_offsets
            WHERE repo_external_id = $1
            "#,
        )
        .bind(repo_external_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn persist_offsets(&self, repo_external_id: &str, offsets: &OffsetsRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO github_ingestion_offsets
                (repo_external_id,
                 last_commit_ingested_at, last_commit_seen_at, last_commit_cursor,
                 last_pr_ingested_at, last_pr_seen_at, last_pr_cursor,
                 last_issue_ingested_at, last_issue_seen_at, last_issue_cursor,
                 last_doc_ingested_at, last_doc_seen_at, last_doc_cursor,
                 updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now())
            ON CONFLICT (repo_external_id) DO UPDATE SET
                last_commit_ingested_at = EXCLUDED.last_commit_ingested_at,
                last_commit_seen_at = EXCLUDED.last_commit_seen_at,
                last_commit_cursor = EXCLUDED.last_commit_cursor,
                last_pr_ingested_at = EXCLUDED.last_pr_ingested_at,
                last_pr_seen_at = EXCLUDED.last_pr_seen_at,
                last_pr_cursor = EXCLUDED.last_pr_cursor,
                last_issue_ingested_at = EXCLUDED.last_issue_ingested_at,
                last_issue_seen_at = EXCLUDED.last_issue_seen_at,
                last_issue_cursor = EXCLUDED.last_issue_cursor,
                last_doc_ingested_at = EXCLUDED.last_doc_ingested_at,
                last_doc_seen_at = EXCLUDED.last_doc_seen_at,
                last_doc_cursor = EXCLUDED.last_doc_cursor,
                updated_at = now()
            "#,
        )
        .bind(repo_external_id)
        .bind(offsets.last_commit_ingested_at)
        .bind(offsets.last_commit_seen_at)
        .bind(&offsets.last_commit_cursor)
        .bind(offsets.last_pr_ingested_at)
        .bind(offsets.last_pr_seen_at)
        .bind(&offsets.last_pr_cursor)
        .bind(offsets.last_issue_ingested_at)
        .bind(offsets.last_issue_seen_at)
        .bind(&offsets.last_issue_cursor)
        .bind(offsets.last_doc_ingested_at)
        .bind(offsets.last_doc_seen_at)
        .bind(&offsets.last_doc_cursor)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Noise filter compilation degrades to an empty (pass-everything)
    /// filter set on any catalogue query failure rather than failing the
    /// ingestion run — a deliberate safety bias toward over-ingesting.
    async fn compile_noise_filters(&self, repo: &RepositoryInfo) -> CompiledNoiseFilters {
        let catalogue = ghillie_core::catalogue::CatalogueStore::new(self.pool.clone());
        match catalogue.noise_configs_for_repository(&repo.external_id).await {
            Ok(configs) => crate::noise::compile_noise_filters(&configs),
            Err(err) => {
                warn!(
                    repo_external_id = %repo.external_id,
                    error = %err,
                    "noise filter compilation failed, ingesting without filters"
                );
                CompiledNoiseFilters::default()
            }
        }
    }
}

fn since_for(watermark: Option<DateTime<Utc>>, now: DateTime<Utc>, config: &GitHubIngestionConfig) -> DateTime<Utc> {
    let base = watermark.unwrap_or(now - config.initial_lookback);
    base - config.overlap
}

fn apply_kind_result(
    result: &StreamIngestionResult,
    was_resuming: bool,
    watermark: &mut Option<DateTime<Utc>>,
    seen: &mut Option<DateTime<Utc>>,
    cursor: &mut Option<String>,
) {
    if result.truncated {
        *seen = max_dt(*seen, result.max_seen);
        *cursor = result.resume_cursor.clone();
        return;
    }

    *cursor = None;
    if was_resuming {
        *watermark = seen.or(result.max_seen).or(*watermark);
        *seen = None;
    } else if result.max_seen.is_some() {
        *watermark = result.max_seen;
    }
}

fn max_dt(left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

fn log_stream_completed(kind: &str, repo_slug: &str, result: &StreamIngestionResult) {
    if result.truncated {
        warn!(
            repo_slug,
            kind,
            ingested = result.ingested,
            "ingestion stream truncated at the per-kind event limit, will resume from cursor"
        );
    } else {
        info!(repo_slug, kind, ingested = result.ingested, "ingestion stream completed");
    }
}

#[path = "ingestion_tests.rs"]
#[cfg(test)]
mod ingestion_tests;
