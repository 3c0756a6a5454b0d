use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
struct OffsetRow {
    repo_external_id: String,
    last_commit_ingested_at: Option<DateTime<Utc>>,
    last_commit_cursor: Option<String>,
    last_pr_ingested_at: Option<DateTime<Utc>>,
    last_pr_cursor: Option<String>,
    last_issue_ingested_at: Option<DateTime<Utc>>,
    last_issue_cursor: Option<String>,
    last_doc_ingested_at: Option<DateTime<Utc>>,
    last_doc_cursor: Option<String>,
}

impl OffsetRow {
    fn watermarks(&self) -> Vec<DateTime<Utc>> {
        [
            self.last_commit_ingested_at,
            self.last_pr_ingested_at,
            self.last_issue_ingested_at,
            self.last_doc_ingested_at,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn has_pending_cursors(&self) -> bool {
        self.last_commit_cursor.is_some()
            || self.last_pr_cursor.is_some()
            || self.last_issue_cursor.is_some()
            || self.last_doc_cursor.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionLagMetrics {
    pub repo_external_id: String,
    pub time_since_last_ingestion: Option<Duration>,
    pub oldest_watermark_age: Option<Duration>,
    pub has_pending_cursors: bool,
    pub is_stalled: bool,
}

#[derive(Debug, Clone)]
pub struct IngestionHealthConfig {
    pub stalled_threshold: Duration,
}

impl Default for IngestionHealthConfig {
    fn default() -> Self {
        Self {
            stalled_threshold: Duration::from_secs(3600),
        }
    }
}

pub struct IngestionHealthService {
    pool: PgPool,
    config: IngestionHealthConfig,
}

impl IngestionHealthService {
    pub fn new(pool: PgPool, config: IngestionHealthConfig) -> Self {
        Self { pool, config }
    }

    pub async fn get_lag_for_repository(
        &self,
        repo_external_id: &str,
    ) -> Result<Option<IngestionLagMetrics>, sqlx::Error> {
        let row: Option<OffsetRow> = sqlx::query_as(
            r#"
            SELECT repo_external_id,
                   last_commit_ingested_at, last_commit_cursor,
                   last_pr_ingested_at, last_pr_cursor,
                   last_issue_ingested_at, last_issue_cursor,
                   last_doc_ingested_at, last_doc_cursor
            FROM github_ingestion_offsets
            WHERE repo_external_id = $1
            "#,
        )
        .bind(repo_external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| self.metrics_for(row)))
    }

    pub async fn get_all_repository_lags(&self) -> Result<Vec<IngestionLagMetrics>, sqlx::Error> {
        let rows: Vec<OffsetRow> = sqlx::query_as(
            r#"
            SELECT repo_external_id,
                   last_commit_ingested_at, last_commit_cursor,
                   last_pr_ingested_at, last_pr_cursor,
                   last_issue_ingested_at, last_issue_cursor,
                   last_doc_ingested_at, last_doc_cursor
            FROM github_ingestion_offsets
            ORDER BY repo_external_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| self.metrics_for(row)).collect())
    }

    pub async fn get_stalled_repositories(&self) -> Result<Vec<IngestionLagMetrics>, sqlx::Error> {
        Ok(self
            .get_all_repository_lags()
            .await?
            .into_iter()
            .filter(|m| m.is_stalled)
            .collect())
    }

    fn metrics_for(&self, row: OffsetRow) -> IngestionLagMetrics {
        let now = Utc::now();
        let has_pending_cursors = row.has_pending_cursors();
        let watermarks = row.watermarks();

        let newest = watermarks.iter().max().copied();
        let oldest = watermarks.iter().min().copied();

        let time_since_last_ingestion = newest.map(|w| age(now, w));
        let oldest_watermark_age = oldest.map(|w| age(now, w));

        let is_stalled = match time_since_last_ingestion {
            None => true,
            Some(age) => age > self.config.stalled_threshold,
        };

        IngestionLagMetrics {
            repo_external_id: row.repo_external_id,
            time_since_last_ingestion,
            oldest_watermark_age,
            has_pending_cursors,
            is_stalled,
        }
    }
}

fn age(now: DateTime<Utc>, watermark: DateTime<Utc>) -> Duration {
    (now - watermark).to_std().unwrap_or(Duration::ZERO)
}
