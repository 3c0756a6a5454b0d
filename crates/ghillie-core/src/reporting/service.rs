//! Orchestrates evidence bundling, status-model invocation, validation,
//! and persistence for a single repository's reporting run.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::ErrorCategory;
use crate::evidence::{BundleError, EvidenceBundler, ReportStatus};
use crate::status::{StatusModel, StatusModelError};

use super::render::render_report_markdown;
use super::sink::{ReportSink, RenderedReport, SinkError};
use super::validation::validate_repository_report;

const DEFAULT_WINDOW: Duration = Duration::hours(24);

/// A persisted report, with the fields an HTTP caller needs to describe
/// what was generated without re-querying the `reports` table.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report_id: uuid::Uuid,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub status: ReportStatus,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum ReportingError {
    #[error("evidence bundling failed: {0}")]
    Bundle(#[from] BundleError),
    #[error("status model failed: {0}")]
    StatusModel(#[from] StatusModelError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("report sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl ReportingError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            ReportingError::Bundle(e) => e.error_category(),
            ReportingError::StatusModel(e) => e.error_category(),
            ReportingError::Database(e) => crate::errors::categorize_sqlx_error(e),
            ReportingError::Sink(_) => ErrorCategory::Unknown,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.error_category(), ErrorCategory::Transient | ErrorCategory::DatabaseConnectivity)
    }
}

pub struct ReportingService {
    pool: PgPool,
    bundler: EvidenceBundler,
    status_model: Arc<dyn StatusModel>,
    sink: Option<Arc<dyn ReportSink>>,
    initial_window: Duration,
}

impl ReportingService {
    pub fn new(pool: PgPool, status_model: Arc<dyn StatusModel>, sink: Option<Arc<dyn ReportSink>>) -> Self {
        let bundler = EvidenceBundler::new(pool.clone());
        Self {
            pool,
            bundler,
            status_model,
            sink,
            initial_window: DEFAULT_WINDOW,
        }
    }

    /// Overrides the lookback window used for a repository's first-ever
    /// report (default 24h). Subsequent runs always continue from the
    /// prior report's `window_end` regardless of this setting.
    pub fn with_initial_window(mut self, window: Duration) -> Self {
        self.initial_window = window;
        self
    }

    /// `[window_start, window_end)` for the next run: continues from the
    /// previous report's end, or falls back to a default 24h lookback
    /// for a repository with no prior report.
    pub async fn compute_next_window(
        &self,
        repo_external_id: &str,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ReportingError> {
        let now = Utc::now();
        let last_window_end: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT r.window_end FROM reports r
            JOIN repositories repo ON repo.id = r.repository_id
            WHERE repo.external_id = $1
            ORDER BY r.window_end DESC
            LIMIT 1
            "#,
        )
        .bind(repo_external_id)
        .fetch_optional(&self.pool)
        .await?;

        let window_start = last_window_end
            .map(|(end,)| end)
            .unwrap_or(now - self.initial_window);

        Ok((window_start, now))
    }

    pub async fn run_for_repository(
        &self,
        repo_external_id: &str,
    ) -> Result<Option<ReportOutcome>, ReportingError> {
        let (window_start, window_end) = self.compute_next_window(repo_external_id).await?;
        self.generate_report(repo_external_id, window_start, window_end)
            .await
    }

    /// Returns `Ok(None)` without invoking the status model when the
    /// window contains no events — an empty bundle is not worth a report.
    pub async fn generate_report(
        &self,
        repo_external_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Option<ReportOutcome>, ReportingError> {
        let bundle = self
            .bundler
            .bundle(repo_external_id, window_start, window_end)
            .await?;

        if bundle.total_event_count() == 0 {
            return Ok(None);
        }

        let result = self.status_model.summarize_repository(&bundle).await?;

        let validation = validate_repository_report(&bundle, &result);
        if !validation.is_valid() {
            warn!(
                repo_external_id,
                issues = ?validation.issues,
                "generated report failed validation checks"
            );
        }

        let markdown = render_report_markdown(&bundle.repository, window_start, window_end, &result);
        let metrics = self.status_model.last_invocation_metrics();

        let mut tx = self.pool.begin().await?;
        let report_id: (uuid::Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO reports
                (repository_id, window_start, window_end, status, summary, highlights, risks, next_steps,
                 model_name, human_text, latency_ms, prompt_tokens, completion_tokens)
            SELECT id, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13 FROM repositories WHERE external_id = $1
            RETURNING id
            "#,
        )
        .bind(repo_external_id)
        .bind(window_start)
        .bind(window_end)
        .bind(status_label(result.status))
        .bind(&result.summary)
        .bind(&result.highlights)
        .bind(&result.risks)
        .bind(&result.next_steps)
        .bind(self.status_model.model_name())
        .bind(&markdown)
        .bind(metrics.as_ref().and_then(|m| m.latency_ms.map(|v| v as i64)))
        .bind(metrics.as_ref().and_then(|m| m.prompt_tokens.map(|v| v as i32)))
        .bind(metrics.as_ref().and_then(|m| m.completion_tokens.map(|v| v as i32)))
        .fetch_one(&mut *tx)
        .await?;

        for event_fact_id in &bundle.event_fact_ids {
            sqlx::query("INSERT INTO report_coverage (report_id, event_fact_id) VALUES ($1, $2)")
                .bind(report_id.0)
                .bind(event_fact_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        if let Some(sink) = &self.sink {
            sink.write(
                &bundle.repository,
                &RenderedReport {
                    generated_at: Utc::now(),
                    markdown,
                },
            )
            .await?;
        }

        info!(repo_external_id, report_id = %report_id.0, "generated repository report");
        Ok(Some(ReportOutcome {
            report_id: report_id.0,
            window_start,
            window_end,
            status: result.status,
            model: self.status_model.model_name().to_string(),
        }))
    }
}

fn status_label(status: crate::evidence::ReportStatus) -> &'static str {
    use crate::evidence::ReportStatus;
    match status {
        ReportStatus::OnTrack => "on_track",
        ReportStatus::AtRisk => "at_risk",
        ReportStatus::Blocked => "blocked",
        ReportStatus::Unknown => "unknown",
    }
}
