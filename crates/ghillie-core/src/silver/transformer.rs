//! Idempotent Bronze -> Silver transformer.
//!
//! Streams PENDING rows in insertion order, promotes each to an
//! `EventFact` (and, where the event type is recognised, a typed entity
//! row), and marks FAILED rows without aborting the rest of the batch.
//! Commits happen every `BATCH_SIZE` rows so a long run doesn't hold one
//! giant transaction open.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::warn;

use crate::bronze::{RawEvent, TransformState};
use crate::errors::ErrorCategory;

use super::types::{
    CommitPayload, DocumentationChangePayload, EventFact, IssuePayload, PullRequestPayload,
};

const BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum RawEventTransformError {
    #[error("existing event fact payload no longer matches Bronze")]
    PayloadMismatch,
    #[error("failed to insert event fact; concurrent transform?")]
    ConcurrentInsert,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RawEventTransformError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            RawEventTransformError::PayloadMismatch => ErrorCategory::DataIntegrity,
            RawEventTransformError::ConcurrentInsert => ErrorCategory::DataIntegrity,
            RawEventTransformError::Database(err) => crate::errors::categorize_sqlx_error(err),
        }
    }
}

pub struct RawEventTransformer {
    pool: PgPool,
}

impl RawEventTransformer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Transform pending raw events, oldest first, up to `limit` rows.
    pub async fn process_pending(&self, limit: Option<i64>) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<RawEventRow> = sqlx::query_as(
            r#"
            SELECT id, source_system, event_type, source_event_id, repo_external_id,
                   occurred_at, payload, dedupe_key, transform_state, transform_error,
                   recorded_at
            FROM raw_events
            WHERE transform_state = $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(TransformState::Pending.as_i16())
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        self.process_events(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// Transform specific raw events regardless of their current state.
    pub async fn process_raw_event_ids(&self, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<RawEventRow> = sqlx::query_as(
            r#"
            SELECT id, source_system, event_type, source_event_id, repo_external_id,
                   occurred_at, payload, dedupe_key, transform_state, transform_error,
                   recorded_at
            FROM raw_events
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        self.process_events(rows.into_iter().map(Into::into).collect())
            .await
    }

    async fn process_events(&self, events: Vec<RawEvent>) -> Result<Vec<i64>, sqlx::Error> {
        let mut processed = Vec::new();
        for chunk in events.chunks(BATCH_SIZE) {
            let mut tx = self.pool.begin().await?;
            for raw_event in chunk {
                match Self::upsert_event_fact(&mut tx, raw_event).await {
                    Ok(_) => {
                        Self::mark_processed(&mut tx, raw_event.id).await?;
                        processed.push(raw_event.id);
                    }
                    Err(err) => {
                        warn!(
                            raw_event_id = raw_event.id,
                            error = %err,
                            "raw event failed to transform"
                        );
                        Self::mark_failed(&mut tx, raw_event.id, &err.to_string()).await?;
                    }
                }
            }
            tx.commit().await?;
        }
        Ok(processed)
    }

    async fn mark_processed(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE raw_events SET transform_state = $1, transform_error = NULL WHERE id = $2")
            .bind(TransformState::Processed.as_i16())
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn mark_failed(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE raw_events SET transform_state = $1, transform_error = $2 WHERE id = $3")
            .bind(TransformState::Failed.as_i16())
            .bind(error)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn upsert_event_fact(
        tx: &mut Transaction<'_, Postgres>,
        raw_event: &RawEvent,
    ) -> Result<EventFact, RawEventTransformError> {
        let existing: Option<EventFactRow> = sqlx::query_as(
            "SELECT id, raw_event_id, repo_external_id, event_type, occurred_at, payload \
             FROM event_facts WHERE raw_event_id = $1",
        )
        .bind(raw_event.id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(existing) = existing {
            if existing.payload != raw_event.payload {
                return Err(RawEventTransformError::PayloadMismatch);
            }
            return Ok(existing.into());
        }

        let inserted: Option<EventFactRow> = sqlx::query_as(
            r#"
            INSERT INTO event_facts (raw_event_id, repo_external_id, event_type, occurred_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (raw_event_id) DO NOTHING
            RETURNING id, raw_event_id, repo_external_id, event_type, occurred_at, payload
            "#,
        )
        .bind(raw_event.id)
        .bind(&raw_event.repo_external_id)
        .bind(&raw_event.event_type)
        .bind(raw_event.occurred_at)
        .bind(&raw_event.payload)
        .fetch_optional(&mut **tx)
        .await?;

        let fact = match inserted {
            Some(row) => row.into(),
            None => {
                // Another worker inserted it concurrently between our
                // check and our insert; read back rather than fail the
                // whole batch over a race.
                let reread: Option<EventFactRow> = sqlx::query_as(
                    "SELECT id, raw_event_id, repo_external_id, event_type, occurred_at, payload \
                     FROM event_facts WHERE raw_event_id = $1",
                )
                .bind(raw_event.id)
                .fetch_optional(&mut **tx)
                .await?;
                reread
                    .map(Into::into)
                    .ok_or(RawEventTransformError::ConcurrentInsert)?
            }
        };

        Self::promote_typed_entity(tx, raw_event).await?;
        Ok(fact)
    }

    /// Best-effort promotion into a typed table. Skipped (with a warning,
    /// not a hard failure) when the repository hasn't been catalogued yet
    /// -- the EventFact itself is still the source of truth.
    async fn promote_typed_entity(
        tx: &mut Transaction<'_, Postgres>,
        raw_event: &RawEvent,
    ) -> Result<(), RawEventTransformError> {
        let Some(repo_external_id) = raw_event.repo_external_id.as_deref() else {
            return Ok(());
        };

        let repository_id: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT id FROM repositories WHERE external_id = $1")
                .bind(repo_external_id)
                .fetch_optional(&mut **tx)
                .await?;

        let Some((repository_id,)) = repository_id else {
            warn!(repo_external_id, "repository not catalogued; skipping typed promotion");
            return Ok(());
        };

        match raw_event.event_type.as_str() {
            "github.commit" => {
                let payload: CommitPayload = serde_json::from_value(raw_event.payload.clone())
                    .map_err(|_| RawEventTransformError::PayloadMismatch)?;
                sqlx::query(
                    r#"
                    INSERT INTO commits (event_fact_id, repository_id, sha, message, author_name, author_email, committed_at)
                    SELECT id, $2, $3, $4, $5, $6, $7 FROM event_facts WHERE raw_event_id = $1
                    ON CONFLICT (repository_id, sha) DO NOTHING
                    "#,
                )
                .bind(raw_event.id)
                .bind(repository_id)
                .bind(&payload.sha)
                .bind(&payload.message)
                .bind(&payload.author_name)
                .bind(&payload.author_email)
                .bind(payload.committed_at)
                .execute(&mut **tx)
                .await?;
            }
            "github.pull_request" => {
                let payload: PullRequestPayload = serde_json::from_value(raw_event.payload.clone())
                    .map_err(|_| RawEventTransformError::PayloadMismatch)?;
                sqlx::query(
                    r#"
                    INSERT INTO pull_requests
                        (event_fact_id, repository_id, number, github_id, title, author_login,
                         state, labels, created_at, merged_at, closed_at, is_draft)
                    SELECT id, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
                    FROM event_facts WHERE raw_event_id = $1
                    ON CONFLICT (repository_id, number) DO UPDATE SET
                        state = EXCLUDED.state, labels = EXCLUDED.labels,
                        merged_at = EXCLUDED.merged_at, closed_at = EXCLUDED.closed_at
                    "#,
                )
                .bind(raw_event.id)
                .bind(repository_id)
                .bind(payload.number)
                .bind(payload.github_id)
                .bind(&payload.title)
                .bind(&payload.author_login)
                .bind(&payload.state)
                .bind(&payload.labels)
                .bind(payload.created_at)
                .bind(payload.merged_at)
                .bind(payload.closed_at)
                .bind(payload.is_draft)
                .execute(&mut **tx)
                .await?;
            }
            "github.issue" => {
                let payload: IssuePayload = serde_json::from_value(raw_event.payload.clone())
                    .map_err(|_| RawEventTransformError::PayloadMismatch)?;
                sqlx::query(
                    r#"
                    INSERT INTO issues
                        (event_fact_id, repository_id, number, github_id, title, author_login,
                         state, labels, created_at, closed_at)
                    SELECT id, $2, $3, $4, $5, $6, $7, $8, $9, $10
                    FROM event_facts WHERE raw_event_id = $1
                    ON CONFLICT (repository_id, number) DO UPDATE SET
                        state = EXCLUDED.state, labels = EXCLUDED.labels, closed_at = EXCLUDED.closed_at
                    "#,
                )
                .bind(raw_event.id)
                .bind(repository_id)
                .bind(payload.number)
                .bind(payload.github_id)
                .bind(&payload.title)
                .bind(&payload.author_login)
                .bind(&payload.state)
                .bind(&payload.labels)
                .bind(payload.created_at)
                .bind(payload.closed_at)
                .execute(&mut **tx)
                .await?;
            }
            "github.doc_change" => {
                let payload: DocumentationChangePayload =
                    serde_json::from_value(raw_event.payload.clone())
                        .map_err(|_| RawEventTransformError::PayloadMismatch)?;
                sqlx::query(
                    r#"
                    INSERT INTO documentation_changes
                        (event_fact_id, repository_id, path, change_type, commit_sha, occurred_at)
                    SELECT id, $2, $3, $4, $5, $6 FROM event_facts WHERE raw_event_id = $1
                    ON CONFLICT (commit_sha, path) DO UPDATE SET
                        change_type = EXCLUDED.change_type, occurred_at = EXCLUDED.occurred_at
                    "#,
                )
                .bind(raw_event.id)
                .bind(repository_id)
                .bind(&payload.path)
                .bind(&payload.change_type)
                .bind(&payload.commit_sha)
                .bind(payload.occurred_at)
                .execute(&mut **tx)
                .await?;
            }
            other => {
                warn!(event_type = other, "no typed promotion for this event type");
            }
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct RawEventRow {
    id: i64,
    source_system: String,
    event_type: String,
    source_event_id: Option<String>,
    repo_external_id: Option<String>,
    occurred_at: chrono::DateTime<Utc>,
    payload: serde_json::Value,
    dedupe_key: String,
    transform_state: i16,
    transform_error: Option<String>,
    recorded_at: chrono::DateTime<Utc>,
}

impl From<RawEventRow> for RawEvent {
    fn from(row: RawEventRow) -> Self {
        RawEvent {
            id: row.id,
            source_system: row.source_system,
            event_type: row.event_type,
            source_event_id: row.source_event_id,
            repo_external_id: row.repo_external_id,
            occurred_at: row.occurred_at,
            payload: row.payload,
            dedupe_key: row.dedupe_key,
            transform_state: TransformState::from_i16(row.transform_state)
                .unwrap_or(TransformState::Pending),
            transform_error: row.transform_error,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventFactRow {
    id: i64,
    raw_event_id: i64,
    repo_external_id: Option<String>,
    event_type: String,
    occurred_at: chrono::DateTime<Utc>,
    payload: serde_json::Value,
}

impl From<EventFactRow> for EventFact {
    fn from(row: EventFactRow) -> Self {
        EventFact {
            id: row.id,
            raw_event_id: row.raw_event_id,
            repo_external_id: row.repo_external_id,
            event_type: row.event_type,
            occurred_at: row.occurred_at,
            payload: row.payload,
        }
    }
}
