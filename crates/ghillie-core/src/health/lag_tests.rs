use super::*;
use sqlx::PgPool;

async fn seed_offset(pool: &PgPool, repo_external_id: &str, commit_ingested_at: Option<DateTime<Utc>>) {
    sqlx::query(
        r#"
        INSERT INTO github_ingestion_offsets (repo_external_id, last_commit_ingested_at)
        VALUES ($1, $2)
        "#,
    )
    .bind(repo_external_id)
    .bind(commit_ingested_at)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn repository_with_no_offsets_row_returns_none(pool: PgPool) {
    let service = IngestionHealthService::new(pool, IngestionHealthConfig::default());
    let lag = service.get_lag_for_repository("owner/repo").await.unwrap();
    assert!(lag.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn repository_with_no_watermarks_is_stalled(pool: PgPool) {
    seed_offset(&pool, "owner/repo", None).await;

    let service = IngestionHealthService::new(pool, IngestionHealthConfig::default());
    let lag = service
        .get_lag_for_repository("owner/repo")
        .await
        .unwrap()
        .unwrap();

    assert!(lag.is_stalled);
    assert!(lag.time_since_last_ingestion.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn recently_ingested_repository_is_not_stalled(pool: PgPool) {
    seed_offset(&pool, "owner/repo", Some(Utc::now())).await;

    let service = IngestionHealthService::new(pool, IngestionHealthConfig::default());
    let lag = service
        .get_lag_for_repository("owner/repo")
        .await
        .unwrap()
        .unwrap();

    assert!(!lag.is_stalled);
}

#[sqlx::test(migrations = "./migrations")]
async fn stale_watermark_beyond_threshold_is_stalled(pool: PgPool) {
    let stale = Utc::now() - chrono::Duration::hours(2);
    seed_offset(&pool, "owner/repo", Some(stale)).await;

    let config = IngestionHealthConfig {
        stalled_threshold: Duration::from_secs(3600),
    };
    let service = IngestionHealthService::new(pool, config);
    let lag = service
        .get_lag_for_repository("owner/repo")
        .await
        .unwrap()
        .unwrap();

    assert!(lag.is_stalled);
}

#[sqlx::test(migrations = "./migrations")]
async fn get_stalled_repositories_filters_to_stalled_only(pool: PgPool) {
    seed_offset(&pool, "owner/fresh", Some(Utc::now())).await;
    seed_offset(&pool, "owner/stale", None).await;

    let service = IngestionHealthService::new(pool, IngestionHealthConfig::default());
    let stalled = service.get_stalled_repositories().await.unwrap();

    assert_eq!(stalled.len(), 1);
    assert_eq!(stalled[0].repo_external_id, "owner/stale");
}
