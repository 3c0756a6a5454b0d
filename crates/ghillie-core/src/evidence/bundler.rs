//! Assembles a [`RepositoryEvidenceBundle`] for a repository and a
//! half-open `[window_start, window_end)` reporting window: load
//! repository metadata, pull the one or two most recent prior reports
//! for continuity, gather typed facts in-window, classify them, and
//! group by work type.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::errors::ErrorCategory;

use super::classify::{classify_work_type, is_merge_commit};
use super::models::{
    CommitEvidence, DocumentationEvidence, IssueEvidence, PreviousReportSummary,
    PullRequestEvidence, RepositoryEvidenceBundle, RepositoryMetadata, ReportStatus, WorkType,
    WorkTypeGrouping,
};

const MAX_PREVIOUS_REPORTS: i64 = 2;
const MAX_SAMPLE_TITLES: usize = 5;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("repository {0} is not catalogued")]
    RepositoryNotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BundleError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            BundleError::RepositoryNotFound(_) => ErrorCategory::ClientError,
            BundleError::Database(err) => crate::errors::categorize_sqlx_error(err),
        }
    }
}

pub struct EvidenceBundler {
    pool: PgPool,
}

impl EvidenceBundler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn bundle(
        &self,
        repo_external_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<RepositoryEvidenceBundle, BundleError> {
        let repo: Option<RepositoryRow> = sqlx::query_as(
            "SELECT id, owner, name, default_branch, estate_id, documentation_paths \
             FROM repositories WHERE external_id = $1",
        )
        .bind(repo_external_id)
        .fetch_optional(&self.pool)
        .await?;

        let repo =
            repo.ok_or_else(|| BundleError::RepositoryNotFound(repo_external_id.to_string()))?;

        let previous_reports = self.load_previous_reports(repo.id, window_start).await?;

        let commit_rows: Vec<CommitRow> = sqlx::query_as(
            r#"
            SELECT sha, message, author_name, author_email, committed_at
            FROM commits
            WHERE repository_id = $1 AND committed_at >= $2 AND committed_at < $3
              AND NOT EXISTS (
                  SELECT 1 FROM report_coverage rc
                  JOIN reports r ON r.id = rc.report_id
                  WHERE rc.event_fact_id = commits.event_fact_id
                    AND (r.repository_id = $1 OR r.project_id IN (
                        SELECT c.project_id FROM components c WHERE c.repository_id = $1
                    ))
              )
            ORDER BY committed_at
            "#,
        )
        .bind(repo.id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        let pr_rows: Vec<PullRequestRow> = sqlx::query_as(
            r#"
            SELECT id, number, title, author_login, state, labels, created_at, merged_at, closed_at, is_draft
            FROM pull_requests
            WHERE repository_id = $1
              AND coalesce(created_at, merged_at, closed_at) >= $2
              AND coalesce(created_at, merged_at, closed_at) < $3
              AND NOT EXISTS (
                  SELECT 1 FROM report_coverage rc
                  JOIN reports r ON r.id = rc.report_id
                  WHERE rc.event_fact_id = pull_requests.event_fact_id
                    AND (r.repository_id = $1 OR r.project_id IN (
                        SELECT c.project_id FROM components c WHERE c.repository_id = $1
                    ))
              )
            ORDER BY created_at
            "#,
        )
        .bind(repo.id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        let issue_rows: Vec<IssueRow> = sqlx::query_as(
            r#"
            SELECT id, number, title, author_login, state, labels, created_at, closed_at
            FROM issues
            WHERE repository_id = $1
              AND coalesce(created_at, closed_at) >= $2
              AND coalesce(created_at, closed_at) < $3
              AND NOT EXISTS (
                  SELECT 1 FROM report_coverage rc
                  JOIN reports r ON r.id = rc.report_id
                  WHERE rc.event_fact_id = issues.event_fact_id
                    AND (r.repository_id = $1 OR r.project_id IN (
                        SELECT c.project_id FROM components c WHERE c.repository_id = $1
                    ))
              )
            ORDER BY created_at
            "#,
        )
        .bind(repo.id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        let doc_rows: Vec<DocumentationRow> = sqlx::query_as(
            r#"
            SELECT dc.path, dc.change_type, dc.commit_sha, dc.occurred_at
            FROM documentation_changes dc
            WHERE dc.repository_id = $1 AND dc.occurred_at >= $2 AND dc.occurred_at < $3
              AND NOT EXISTS (
                  SELECT 1 FROM report_coverage rc
                  JOIN reports r ON r.id = rc.report_id
                  WHERE rc.event_fact_id = dc.event_fact_id
                    AND (r.repository_id = $1 OR r.project_id IN (
                        SELECT c.project_id FROM components c WHERE c.repository_id = $1
                    ))
              )
            ORDER BY dc.occurred_at
            "#,
        )
        .bind(repo.id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        let commits: Vec<CommitEvidence> = commit_rows
            .into_iter()
            .map(|row| {
                let work_type = classify_work_type(row.message.as_deref().unwrap_or(""), &[]);
                let is_merge = row
                    .message
                    .as_deref()
                    .map(is_merge_commit)
                    .unwrap_or(false);
                CommitEvidence {
                    sha: row.sha,
                    message: row.message,
                    author_name: row.author_name,
                    author_email: row.author_email,
                    committed_at: row.committed_at,
                    work_type,
                    is_merge_commit: is_merge,
                }
            })
            .collect();

        let pull_requests: Vec<PullRequestEvidence> = pr_rows
            .into_iter()
            .map(|row| {
                let work_type = classify_work_type(&row.title, &row.labels);
                PullRequestEvidence {
                    id: row.id,
                    number: row.number,
                    title: row.title,
                    author_login: row.author_login,
                    state: row.state,
                    labels: row.labels,
                    created_at: row.created_at,
                    merged_at: row.merged_at,
                    closed_at: row.closed_at,
                    work_type,
                    is_draft: row.is_draft,
                }
            })
            .collect();

        let issues: Vec<IssueEvidence> = issue_rows
            .into_iter()
            .map(|row| {
                let work_type = classify_work_type(&row.title, &row.labels);
                IssueEvidence {
                    id: row.id,
                    number: row.number,
                    title: row.title,
                    author_login: row.author_login,
                    state: row.state,
                    labels: row.labels,
                    created_at: row.created_at,
                    closed_at: row.closed_at,
                    work_type,
                }
            })
            .collect();

        let documentation_changes: Vec<DocumentationEvidence> = doc_rows
            .into_iter()
            .map(|row| {
                let lowered = row.path.to_lowercase();
                DocumentationEvidence {
                    is_roadmap: lowered.contains("roadmap"),
                    is_adr: lowered.contains("/adr") || lowered.ends_with("adr") || lowered.contains("architecture-decision"),
                    path: row.path,
                    change_type: row.change_type,
                    commit_sha: row.commit_sha,
                    occurred_at: row.occurred_at,
                }
            })
            .collect();

        let work_type_groupings = group_by_work_type(&commits, &pull_requests, &issues);

        let event_fact_ids = self.event_fact_ids_in_window(repo.id, window_start, window_end).await?;

        Ok(RepositoryEvidenceBundle {
            repository: RepositoryMetadata {
                id: repo.id.to_string(),
                owner: repo.owner,
                name: repo.name,
                default_branch: repo.default_branch,
                estate_id: repo.estate_id,
                documentation_paths: repo.documentation_paths,
            },
            window_start,
            window_end,
            previous_reports,
            commits,
            pull_requests,
            issues,
            documentation_changes,
            work_type_groupings,
            event_fact_ids,
            generated_at: Some(Utc::now()),
        })
    }

    async fn load_previous_reports(
        &self,
        repository_id: uuid::Uuid,
        before: DateTime<Utc>,
    ) -> Result<Vec<PreviousReportSummary>, sqlx::Error> {
        let rows: Vec<PreviousReportRow> = sqlx::query_as(
            r#"
            SELECT id, window_start, window_end, status, highlights, risks,
                   (SELECT count(*) FROM report_coverage rc WHERE rc.report_id = reports.id) AS event_count
            FROM reports
            WHERE repository_id = $1 AND window_end <= $2
            ORDER BY window_end DESC
            LIMIT $3
            "#,
        )
        .bind(repository_id)
        .bind(before)
        .bind(MAX_PREVIOUS_REPORTS)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PreviousReportSummary {
                report_id: row.id.to_string(),
                window_start: row.window_start,
                window_end: row.window_end,
                status: parse_report_status(&row.status),
                highlights: row.highlights,
                risks: row.risks,
                event_count: row.event_count,
            })
            .collect())
    }

    async fn event_fact_ids_in_window(
        &self,
        repository_id: uuid::Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT ef.id FROM event_facts ef
            JOIN repositories r ON r.external_id = ef.repo_external_id
            WHERE r.id = $1 AND ef.occurred_at >= $2 AND ef.occurred_at < $3
              AND NOT EXISTS (
                  SELECT 1 FROM report_coverage rc
                  JOIN reports rep ON rep.id = rc.report_id
                  WHERE rc.event_fact_id = ef.id
                    AND (rep.repository_id = $1 OR rep.project_id IN (
                        SELECT c.project_id FROM components c WHERE c.repository_id = $1
                    ))
              )
            "#,
        )
        .bind(repository_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

fn parse_report_status(value: &str) -> ReportStatus {
    match value {
        "on_track" => ReportStatus::OnTrack,
        "at_risk" => ReportStatus::AtRisk,
        "blocked" => ReportStatus::Blocked,
        _ => ReportStatus::Unknown,
    }
}

fn group_by_work_type(
    commits: &[CommitEvidence],
    pull_requests: &[PullRequestEvidence],
    issues: &[IssueEvidence],
) -> Vec<WorkTypeGrouping> {
    let work_types = [
        WorkType::Feature,
        WorkType::Bug,
        WorkType::Refactor,
        WorkType::Chore,
        WorkType::Documentation,
        WorkType::Unknown,
    ];

    work_types
        .into_iter()
        .filter_map(|work_type| {
            let commit_count = commits.iter().filter(|c| c.work_type == work_type).count();
            let pr_count = pull_requests
                .iter()
                .filter(|p| p.work_type == work_type)
                .count();
            let issue_count = issues.iter().filter(|i| i.work_type == work_type).count();

            if commit_count + pr_count + issue_count == 0 {
                return None;
            }

            let sample_titles = pull_requests
                .iter()
                .filter(|p| p.work_type == work_type)
                .map(|p| p.title.clone())
                .chain(issues.iter().filter(|i| i.work_type == work_type).map(|i| i.title.clone()))
                .take(MAX_SAMPLE_TITLES)
                .collect();

            Some(WorkTypeGrouping {
                work_type,
                commit_count,
                pr_count,
                issue_count,
                sample_titles,
            })
        })
        .collect()
}

#[derive(sqlx::FromRow)]
struct RepositoryRow {
    id: uuid::Uuid,
    owner: String,
    name: String,
    default_branch: String,
    estate_id: Option<String>,
    documentation_paths: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct CommitRow {
    sha: String,
    message: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    committed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct PullRequestRow {
    id: i64,
    number: i32,
    title: String,
    author_login: Option<String>,
    state: String,
    labels: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    is_draft: bool,
}

#[derive(sqlx::FromRow)]
struct IssueRow {
    id: i64,
    number: i32,
    title: String,
    author_login: Option<String>,
    state: String,
    labels: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct DocumentationRow {
    path: String,
    change_type: String,
    commit_sha: String,
    occurred_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PreviousReportRow {
    id: uuid::Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    status: String,
    highlights: Vec<String>,
    risks: Vec<String>,
    event_count: i64,
}
