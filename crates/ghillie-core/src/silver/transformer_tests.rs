use super::*;
use crate::bronze::{RawEventWriter, RawEventEnvelope};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

async fn seed_repository(pool: &PgPool, external_id: &str) {
    sqlx::query(
        "INSERT INTO repositories (external_id, owner, name) VALUES ($1, 'acme', 'widgets')",
    )
    .bind(external_id)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn process_pending_promotes_a_commit_event(pool: PgPool) {
    seed_repository(&pool, "repo-1").await;
    let writer = RawEventWriter::new(pool.clone());
    writer
        .ingest(RawEventEnvelope {
            source_system: "github".into(),
            event_type: "github.commit".into(),
            source_event_id: Some("sha-1".into()),
            repo_external_id: Some("repo-1".into()),
            occurred_at: Utc::now(),
            payload: json!({
                "sha": "sha-1",
                "message": "fix: widget alignment",
                "author_name": "Ada",
                "author_email": "ada@example.com",
                "committed_at": Utc::now().to_rfc3339(),
            }),
        })
        .await
        .unwrap();

    let transformer = RawEventTransformer::new(pool.clone());
    let processed = transformer.process_pending(None).await.unwrap();
    assert_eq!(processed.len(), 1);

    let commit_count: (i64,) = sqlx::query_as("SELECT count(*) FROM commits")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(commit_count.0, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn reprocessing_the_same_event_is_a_no_op(pool: PgPool) {
    seed_repository(&pool, "repo-2").await;
    let writer = RawEventWriter::new(pool.clone());
    let raw = writer
        .ingest(RawEventEnvelope {
            source_system: "github".into(),
            event_type: "github.commit".into(),
            source_event_id: Some("sha-2".into()),
            repo_external_id: Some("repo-2".into()),
            occurred_at: Utc::now(),
            payload: json!({"sha": "sha-2"}),
        })
        .await
        .unwrap();

    let transformer = RawEventTransformer::new(pool.clone());
    transformer.process_raw_event_ids(&[raw.id]).await.unwrap();
    transformer.process_raw_event_ids(&[raw.id]).await.unwrap();

    let fact_count: (i64,) = sqlx::query_as("SELECT count(*) FROM event_facts WHERE raw_event_id = $1")
        .bind(raw.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fact_count.0, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn unrecognised_event_type_still_promotes_the_event_fact(pool: PgPool) {
    let writer = RawEventWriter::new(pool.clone());
    let raw = writer
        .ingest(RawEventEnvelope {
            source_system: "github".into(),
            event_type: "release".into(),
            source_event_id: Some("rel-1".into()),
            repo_external_id: None,
            occurred_at: Utc::now(),
            payload: json!({"tag": "v1.0.0"}),
        })
        .await
        .unwrap();

    let transformer = RawEventTransformer::new(pool.clone());
    let processed = transformer.process_raw_event_ids(&[raw.id]).await.unwrap();
    assert_eq!(processed, vec![raw.id]);
}
