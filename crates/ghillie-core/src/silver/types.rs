use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A promoted, typed fact derived from one Bronze row. `payload` retains
/// the source JSON so a payload-mismatch can be detected on reprocessing
/// without re-deriving every typed field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFact {
    pub id: i64,
    pub raw_event_id: i64,
    pub repo_external_id: Option<String>,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Shape of `RawEvent.payload` for `event_type == "github.commit"`.
/// Produced by the GitHub GraphQL client and consumed here to promote a
/// typed `commits` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitPayload {
    pub sha: String,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub number: i32,
    pub github_id: i64,
    pub title: String,
    pub author_login: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_draft: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePayload {
    pub number: i32,
    pub github_id: i64,
    pub title: String,
    pub author_login: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationChangePayload {
    pub path: String,
    pub change_type: String,
    pub commit_sha: String,
    pub occurred_at: DateTime<Utc>,
    pub is_roadmap: bool,
    pub is_adr: bool,
}
