use super::*;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

fn sample_envelope(event_id: &str) -> RawEventEnvelope {
    RawEventEnvelope {
        source_system: "github".into(),
        event_type: "github.commit".into(),
        source_event_id: Some(event_id.into()),
        repo_external_id: Some("repo-1".into()),
        occurred_at: Utc::now(),
        payload: json!({"sha": event_id}),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn ingest_persists_a_new_row(pool: PgPool) {
    let writer = RawEventWriter::new(pool);
    let row = writer.ingest(sample_envelope("sha-1")).await.unwrap();

    assert_eq!(row.transform_state, TransformState::Pending);
    assert_eq!(row.source_event_id.as_deref(), Some("sha-1"));
}

#[sqlx::test(migrations = "./migrations")]
async fn ingest_is_idempotent_for_the_same_logical_event(pool: PgPool) {
    let writer = RawEventWriter::new(pool);
    let first = writer.ingest(sample_envelope("sha-2")).await.unwrap();
    let second = writer.ingest(sample_envelope("sha-2")).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn ingest_treats_distinct_events_independently(pool: PgPool) {
    let writer = RawEventWriter::new(pool);
    let a = writer.ingest(sample_envelope("sha-3")).await.unwrap();
    let b = writer.ingest(sample_envelope("sha-4")).await.unwrap();

    assert_ne!(a.id, b.id);
}
