//! At-most-once raw event persistence.
//!
//! Insert, and on a unique violation of `(source_system, dedupe_key)`
//! treat the existing row as the outcome rather than surfacing a write
//! conflict to the caller.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use crate::errors::ErrorCategory;

use super::dedupe::{make_dedupe_key, DedupeError};
use super::types::{RawEvent, RawEventEnvelope, TransformState};

#[derive(Debug, Error)]
pub enum BronzeError {
    #[error("payload could not be canonicalised: {0}")]
    Dedupe(#[from] DedupeError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(
        "insert of raw event conflicted with an existing dedupe key, but the existing row \
         could not be found on read-back"
    )]
    PersistInvariant,
}

impl BronzeError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            BronzeError::Dedupe(_) => ErrorCategory::ClientError,
            BronzeError::Database(err) => crate::errors::categorize_sqlx_error(err),
            BronzeError::PersistInvariant => ErrorCategory::DataIntegrity,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self.error_category(),
            ErrorCategory::DatabaseConnectivity | ErrorCategory::Transient
        )
    }
}

/// Writes raw event envelopes into the Bronze table, deduplicating on
/// `(source_system, dedupe_key)`.
#[derive(Debug, Clone)]
pub struct RawEventWriter {
    pool: PgPool,
}

impl RawEventWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert `envelope`, or return the already-persisted row if an event
    /// with the same dedupe key was ingested previously. Never produces a
    /// duplicate row for the same logical event.
    pub async fn ingest(&self, envelope: RawEventEnvelope) -> Result<RawEvent, BronzeError> {
        let dedupe_key = make_dedupe_key(&envelope)?;

        let inserted: Option<RawEventRow> = sqlx::query_as(
            r#"
            INSERT INTO raw_events
                (source_system, event_type, source_event_id, repo_external_id,
                 occurred_at, payload, dedupe_key, transform_state, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (source_system, dedupe_key) DO NOTHING
            RETURNING id, source_system, event_type, source_event_id, repo_external_id,
                      occurred_at, payload, dedupe_key, transform_state, transform_error,
                      recorded_at
            "#,
        )
        .bind(&envelope.source_system)
        .bind(&envelope.event_type)
        .bind(&envelope.source_event_id)
        .bind(&envelope.repo_external_id)
        .bind(envelope.occurred_at)
        .bind(&envelope.payload)
        .bind(&dedupe_key)
        .bind(TransformState::Pending.as_i16())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }

        let existing: Option<RawEventRow> = sqlx::query_as(
            r#"
            SELECT id, source_system, event_type, source_event_id, repo_external_id,
                   occurred_at, payload, dedupe_key, transform_state, transform_error,
                   recorded_at
            FROM raw_events
            WHERE source_system = $1 AND dedupe_key = $2
            "#,
        )
        .bind(&envelope.source_system)
        .bind(&dedupe_key)
        .fetch_optional(&self.pool)
        .await?;

        existing.map(Into::into).ok_or(BronzeError::PersistInvariant)
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
