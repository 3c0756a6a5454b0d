//! Evidence bundle value types shared by the bundler, status models, and
//! report rendering. Every optional field carries a `Default`-friendly
//! value so constructors can use plain struct literal syntax.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Feature,
    Bug,
    Refactor,
    Chore,
    Documentation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    OnTrack,
    AtRisk,
    Blocked,
    Unknown,
}

/// Repository identification and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub default_branch: String,
    pub estate_id: Option<String>,
    pub documentation_paths: Vec<String>,
}

impl RepositoryMetadata {
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Summary of a previous report, kept for continuity context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousReportSummary {
    pub report_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub status: ReportStatus,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub event_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEvidence {
    pub sha: String,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
    pub work_type: WorkType,
    pub is_merge_commit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvidence {
    pub id: i64,
    pub number: i32,
    pub title: String,
    pub author_login: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub work_type: WorkType,
    pub is_draft: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvidence {
    pub id: i64,
    pub number: i32,
    pub title: String,
    pub author_login: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub work_type: WorkType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationEvidence {
    pub path: String,
    pub change_type: String,
    pub commit_sha: String,
    pub occurred_at: DateTime<Utc>,
    pub is_roadmap: bool,
    pub is_adr: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTypeGrouping {
    pub work_type: WorkType,
    pub commit_count: usize,
    pub pr_count: usize,
    pub issue_count: usize,
    pub sample_titles: Vec<String>,
}

/// Complete evidence bundle handed to the status model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEvidenceBundle {
    pub repository: RepositoryMetadata,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub previous_reports: Vec<PreviousReportSummary>,
    pub commits: Vec<CommitEvidence>,
    pub pull_requests: Vec<PullRequestEvidence>,
    pub issues: Vec<IssueEvidence>,
    pub documentation_changes: Vec<DocumentationEvidence>,
    pub work_type_groupings: Vec<WorkTypeGrouping>,
    pub event_fact_ids: Vec<i64>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl RepositoryEvidenceBundle {
    pub fn total_event_count(&self) -> usize {
        self.commits.len()
            + self.pull_requests.len()
            + self.issues.len()
            + self.documentation_changes.len()
    }

    pub fn has_previous_context(&self) -> bool {
        !self.previous_reports.is_empty()
    }
}
