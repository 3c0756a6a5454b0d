//! GitHub GraphQL implementation of [`GitHubActivityClient`]: three
//! queries (commit history for a ref/path, pull requests, issues, the
//! latter two ordered by `UPDATED_AT` descending), a stop-on-stale-page
//! rule for PRs/issues, and path-based documentation-change
//! classification.

use std::env;

use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde_json::{json, Value};

use crate::client::{GitHubActivityClient, GitHubClientError, GitHubIngestedEvent};

const COMMITS_QUERY: &str = r#"
query(
  $owner: String!
  $name: String!
  $qualifiedName: String!
  $since: GitTimestamp!
  $after: String
  $path: String
) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $qualifiedName) {
      target {
        ... on Commit {
          history(first: 100, since: $since, after: $after, path: $path) {
            pageInfo { hasNextPage endCursor }
            edges {
              cursor
              node {
                oid
                message
                authoredDate
                committedDate
                author { name email }
              }
            }
          }
        }
      }
    }
  }
}
"#;

const PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $name: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: 100, after: $after, orderBy: {field: UPDATED_AT, direction: DESC}) {
      pageInfo { hasNextPage endCursor }
      edges {
        cursor
        node {
          databaseId number title state isDraft
          createdAt updatedAt mergedAt closedAt baseRefName headRefName
          author { login }
          labels(first: 50) { nodes { name } }
        }
      }
    }
  }
}
"#;

const ISSUES_QUERY: &str = r#"
query($owner: String!, $name: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    issues(first: 100, after: $after, orderBy: {field: UPDATED_AT, direction: DESC}) {
      pageInfo { hasNextPage endCursor }
      edges {
        cursor
        node {
          databaseId number title state
          createdAt updatedAt closedAt
          author { login }
          labels(first: 50) { nodes { name } }
        }
      }
    }
  }
}
"#;

/// A path is a roadmap change iff its lowercase form contains `roadmap`;
/// it is an ADR change iff it contains `/adr`, ends with `adr`, or
/// contains `architecture-decision`. Both flags may be true.
pub fn classify_documentation_path(path: &str) -> (bool, bool) {
    let lowered = path.to_ascii_lowercase();
    let is_roadmap = lowered.contains("roadmap");
    let is_adr = lowered.contains("/adr") || lowered.ends_with("adr") || lowered.contains("architecture-decision");
    (is_roadmap, is_adr)
}

#[derive(Debug, Clone)]
pub struct GitHubGraphQlConfig {
    pub token: String,
    pub endpoint: String,
    pub timeout: std::time::Duration,
    pub user_agent: String,
}

impl GitHubGraphQlConfig {
    pub fn from_env() -> Result<Self, GitHubClientError> {
        let token = env::var("GHILLIE_GITHUB_TOKEN").unwrap_or_default().trim().to_string();
        if token.is_empty() {
            return Err(GitHubClientError::Config {
                message: "GHILLIE_GITHUB_TOKEN is not set".into(),
            });
        }
        Ok(Self {
            token,
            endpoint: "https://api.github.com/graphql".into(),
            timeout: std::time::Duration::from_secs(20),
            user_agent: "ghillie/0.1".into(),
        })
    }
}

pub struct GitHubGraphQlClient {
    config: GitHubGraphQlConfig,
    http: reqwest::Client,
}

impl GitHubGraphQlClient {
    pub fn new(config: GitHubGraphQlConfig) -> Result<Self, GitHubClientError> {
        if config.token.trim().is_empty() {
            return Err(GitHubClientError::Config {
                message: "GitHub token must not be empty".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GitHubClientError::Config {
                message: err.to_string(),
            })?;
        Ok(Self { config, http })
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, GitHubClientError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|_| GitHubClientError::HttpError { status: 0 })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubClientError::HttpError { status: status.as_u16() });
        }

        let body: Value = response.json().await.map_err(|_| GitHubClientError::ResponseShape {
            field: "body".into(),
        })?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            let messages = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str).map(str::to_string))
                .collect();
            return Err(GitHubClientError::GraphqlErrors { messages });
        }

        body.get("data").cloned().ok_or(GitHubClientError::ResponseShape {
            field: "data".into(),
        })
    }
}

fn field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, GitHubClientError> {
    let mut current = value;
    for key in path {
        current = current.get(key).ok_or_else(|| GitHubClientError::ResponseShape {
            field: path.join("."),
        })?;
    }
    Ok(current)
}

fn parse_github_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

fn label_names(labels: &Value) -> Vec<String> {
    labels
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| n.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn maybe_login(author: &Value) -> Option<String> {
    author.get("login").and_then(Value::as_str).map(str::to_string)
}

fn coerce_pr_state(state: &str, merged_at: &Value) -> String {
    let lowered = state.to_ascii_lowercase();
    if lowered == "closed" && !merged_at.is_null() {
        "merged".to_string()
    } else {
        lowered
    }
}

impl GitHubActivityClient for GitHubGraphQlClient {
    fn stream_commits<'a>(
        &'a self,
        repo_slug: &'a str,
        default_branch: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>> {
        Box::pin(try_stream! {
            let (owner, name) = split_slug(repo_slug)?;
            let qualified_name = format!("refs/heads/{default_branch}");
            let mut after = after;

            loop {
                let data = self
                    .graphql(
                        COMMITS_QUERY,
                        json!({
                            "owner": owner, "name": name, "qualifiedName": qualified_name,
                            "since": since.to_rfc3339(), "after": after, "path": Value::Null,
                        }),
                    )
                    .await?;

                let history = field(&data, &["repository", "ref", "target", "history"])?;
                let edges = history.get("edges").and_then(Value::as_array).ok_or_else(|| {
                    GitHubClientError::ResponseShape { field: "history.edges".into() }
                })?;

                for edge in edges {
                    let Some(node) = edge.get("node") else { continue };
                    let (Some(oid), Some(committed_date)) = (
                        node.get("oid").and_then(Value::as_str),
                        node.get("committedDate").and_then(Value::as_str),
                    ) else { continue };
                    let Some(occurred_at) = parse_github_datetime(committed_date) else { continue };
                    if occurred_at <= since {
                        continue;
                    }

                    let author = node.get("author").cloned().unwrap_or(Value::Null);
                    let payload = json!({
                        "sha": oid,
                        "message": node.get("message"),
                        "author_name": author.get("name"),
                        "author_email": author.get("email"),
                        "committed_at": committed_date,
                    });
                    yield GitHubIngestedEvent {
                        event_type: "github.commit".into(),
                        source_event_id: Some(oid.to_string()),
                        occurred_at,
                        payload,
                        cursor: edge.get("cursor").and_then(Value::as_str).unwrap_or(oid).to_string(),
                    };
                }

                let page_info = history.get("pageInfo");
                let has_next = page_info.and_then(|p| p.get("hasNextPage")).and_then(Value::as_bool).unwrap_or(false);
                if !has_next {
                    break;
                }
                after = page_info.and_then(|p| p.get("endCursor")).and_then(Value::as_str).map(str::to_string);
                if after.is_none() {
                    break;
                }
            }
        })
    }

    fn stream_pull_requests<'a>(
        &'a self,
        repo_slug: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>> {
        Box::pin(try_stream! {
            let (owner, name) = split_slug(repo_slug)?;
            let mut after = after;

            'page: loop {
                let data = self
                    .graphql(PULL_REQUESTS_QUERY, json!({ "owner": owner, "name": name, "after": after }))
                    .await?;
                let connection = field(&data, &["repository", "pullRequests"])?;
                let edges = connection.get("edges").and_then(Value::as_array).ok_or_else(|| {
                    GitHubClientError::ResponseShape { field: "pullRequests.edges".into() }
                })?;

                for edge in edges {
                    let Some(node) = edge.get("node") else { continue };
                    let updated_at_raw = node.get("updatedAt").and_then(Value::as_str);
                    let database_id = node.get("databaseId").and_then(Value::as_i64);
                    let (Some(updated_at_raw), Some(database_id)) = (updated_at_raw, database_id) else {
                        continue;
                    };
                    let Some(updated_at) = parse_github_datetime(updated_at_raw) else { continue };
                    if updated_at <= since {
                        break 'page;
                    }

                    let merged_at = node.get("mergedAt").cloned().unwrap_or(Value::Null);
                    let labels = node.get("labels").cloned().unwrap_or(Value::Null);
                    let author = node.get("author").cloned().unwrap_or(Value::Null);
                    let payload = json!({
                        "github_id": database_id,
                        "number": node.get("number"),
                        "title": node.get("title"),
                        "author_login": maybe_login(&author),
                        "state": coerce_pr_state(node.get("state").and_then(Value::as_str).unwrap_or(""), &merged_at),
                        "created_at": node.get("createdAt"),
                        "merged_at": merged_at,
                        "closed_at": node.get("closedAt"),
                        "labels": label_names(&labels),
                        "is_draft": node.get("isDraft").and_then(Value::as_bool).unwrap_or(false),
                    });
                    let cursor = edge
                        .get("cursor")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| database_id.to_string());
                    yield GitHubIngestedEvent {
                        event_type: "github.pull_request".into(),
                        source_event_id: Some(database_id.to_string()),
                        occurred_at: updated_at,
                        payload,
                        cursor,
                    };
                }

                let page_info = connection.get("pageInfo");
                let has_next = page_info.and_then(|p| p.get("hasNextPage")).and_then(Value::as_bool).unwrap_or(false);
                if !has_next {
                    break;
                }
                after = page_info.and_then(|p| p.get("endCursor")).and_then(Value::as_str).map(str::to_string);
                if after.is_none() {
                    break;
                }
            }
        })
    }

    fn stream_issues<'a>(
        &'a self,
        repo_slug: &'a str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>> {
        Box::pin(try_stream! {
            let (owner, name) = split_slug(repo_slug)?;
            let mut after = after;

            'page: loop {
                let data = self
                    .graphql(ISSUES_QUERY, json!({ "owner": owner, "name": name, "after": after }))
                    .await?;
                let connection = field(&data, &["repository", "issues"])?;
                let edges = connection.get("edges").and_then(Value::as_array).ok_or_else(|| {
                    GitHubClientError::ResponseShape { field: "issues.edges".into() }
                })?;

                for edge in edges {
                    let Some(node) = edge.get("node") else { continue };
                    let updated_at_raw = node.get("updatedAt").and_then(Value::as_str);
                    let database_id = node.get("databaseId").and_then(Value::as_i64);
                    let (Some(updated_at_raw), Some(database_id)) = (updated_at_raw, database_id) else {
                        continue;
                    };
                    let Some(updated_at) = parse_github_datetime(updated_at_raw) else { continue };
                    if updated_at <= since {
                        break 'page;
                    }

                    let labels = node.get("labels").cloned().unwrap_or(Value::Null);
                    let author = node.get("author").cloned().unwrap_or(Value::Null);
                    let payload = json!({
                        "github_id": database_id,
                        "number": node.get("number"),
                        "title": node.get("title"),
                        "author_login": maybe_login(&author),
                        "state": node.get("state").and_then(Value::as_str).unwrap_or("").to_ascii_lowercase(),
                        "created_at": node.get("createdAt"),
                        "closed_at": node.get("closedAt"),
                        "labels": label_names(&labels),
                    });
                    let cursor = edge
                        .get("cursor")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| database_id.to_string());
                    yield GitHubIngestedEvent {
                        event_type: "github.issue".into(),
                        source_event_id: Some(database_id.to_string()),
                        occurred_at: updated_at,
                        payload,
                        cursor,
                    };
                }

                let page_info = connection.get("pageInfo");
                let has_next = page_info.and_then(|p| p.get("hasNextPage")).and_then(Value::as_bool).unwrap_or(false);
                if !has_next {
                    break;
                }
                after = page_info.and_then(|p| p.get("endCursor")).and_then(Value::as_str).map(str::to_string);
                if after.is_none() {
                    break;
                }
            }
        })
    }

    fn stream_doc_changes<'a>(
        &'a self,
        repo_slug: &'a str,
        default_branch: &'a str,
        documentation_paths: &'a [String],
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> BoxStream<'a, Result<GitHubIngestedEvent, GitHubClientError>> {
        Box::pin(try_stream! {
            let (owner, name) = split_slug(repo_slug)?;
            let qualified_name = format!("refs/heads/{default_branch}");
            let (resume_index, resume_cursor) = decode_doc_resume_cursor(after.as_deref());

            for (path_index, path) in documentation_paths.iter().enumerate() {
                if path_index < resume_index {
                    continue;
                }
                let (is_roadmap, is_adr) = classify_documentation_path(path);
                let mut cursor = if path_index == resume_index { resume_cursor.clone() } else { None };

                loop {
                    let data = self
                        .graphql(
                            COMMITS_QUERY,
                            json!({
                                "owner": owner, "name": name, "qualifiedName": qualified_name,
                                "since": since.to_rfc3339(), "after": cursor, "path": path,
                            }),
                        )
                        .await?;

                    let history = field(&data, &["repository", "ref", "target", "history"])?;
                    let edges = history.get("edges").and_then(Value::as_array).ok_or_else(|| {
                        GitHubClientError::ResponseShape { field: "history.edges".into() }
                    })?;

                    for edge in edges {
                        let Some(node) = edge.get("node") else { continue };
                        let (Some(oid), Some(committed_date)) = (
                            node.get("oid").and_then(Value::as_str),
                            node.get("committedDate").and_then(Value::as_str),
                        ) else { continue };
                        let Some(occurred_at) = parse_github_datetime(committed_date) else { continue };
                        if occurred_at <= since {
                            continue;
                        }

                        let payload = json!({
                            "path": path,
                            "change_type": "modified",
                            "commit_sha": oid,
                            "occurred_at": committed_date,
                            "is_roadmap": is_roadmap,
                            "is_adr": is_adr,
                        });
                        let edge_cursor = edge.get("cursor").and_then(Value::as_str).unwrap_or(oid);
                        yield GitHubIngestedEvent {
                            event_type: "github.doc_change".into(),
                            source_event_id: Some(format!("{oid}:{path}")),
                            occurred_at,
                            payload,
                            cursor: encode_doc_resume_cursor(path_index, edge_cursor),
                        };
                    }

                    let page_info = history.get("pageInfo");
                    let has_next = page_info.and_then(|p| p.get("hasNextPage")).and_then(Value::as_bool).unwrap_or(false);
                    if !has_next {
                        break;
                    }
                    cursor = page_info.and_then(|p| p.get("endCursor")).and_then(Value::as_str).map(str::to_string);
                    if cursor.is_none() {
                        break;
                    }
                }
            }
        })
    }
}

/// `stream_doc_changes` walks `documentation_paths` in order, one
/// commit-history query per path; the opaque cursor it hands back
/// therefore has to carry both which path was in progress and that
/// path's own page cursor, or a resumed run would restart every path
/// from the beginning of `since`. Encoded as `<path_index>:<cursor>`.
fn encode_doc_resume_cursor(path_index: usize, cursor: &str) -> String {
    format!("{path_index}:{cursor}")
}

fn decode_doc_resume_cursor(cursor: Option<&str>) -> (usize, Option<String>) {
    let Some(cursor) = cursor else { return (0, None) };
    match cursor.split_once(':') {
        Some((index, rest)) => match index.parse() {
            Ok(index) => (index, Some(rest.to_string())),
            Err(_) => (0, None),
        },
        None => (0, None),
    }
}

fn split_slug(slug: &str) -> Result<(&str, &str), GitHubClientError> {
    slug.split_once('/').ok_or_else(|| GitHubClientError::Config {
        message: format!("repository slug '{slug}' is not in owner/name form"),
    })
}

#[path = "graphql_tests.rs"]
#[cfg(test)]
mod graphql_tests;
