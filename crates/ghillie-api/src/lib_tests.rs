use super::*;
use ghillie_core::status::MockStatusModel;
use sqlx::PgPool;
use std::sync::OnceLock;

/// Prometheus registers metrics in a process-global registry, so every
/// test in this file must share one `ApiMetrics` rather than each
/// constructing its own (which would panic on the second registration).
fn test_metrics() -> Arc<ApiMetrics> {
    static METRICS: OnceLock<Arc<ApiMetrics>> = OnceLock::new();
    METRICS
        .get_or_init(|| Arc::new(ApiMetrics::new().expect("metrics register exactly once")))
        .clone()
}

#[tokio::test]
async fn health_handler_reports_ok() {
    let body = health_handler().await;
    assert_eq!(body.status, "ok");
}

#[sqlx::test(migrations = "../ghillie-core/migrations")]
async fn ready_handler_reports_ready_when_database_is_reachable(pool: PgPool) {
    let reporting = Arc::new(ReportingService::new(
        pool.clone(),
        Arc::new(MockStatusModel::new()),
        None,
    ));
    let state = Arc::new(AppState::with_database(pool, reporting, test_metrics()));

    let response = ready_handler(State(state)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn ready_handler_is_ready_in_health_only_mode() {
    let state = Arc::new(AppState::health_only(test_metrics()));
    let response = ready_handler(State(state)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn report_handler_404s_for_unknown_repository_in_health_only_mode() {
    let state = Arc::new(AppState::health_only(test_metrics()));
    let result = generate_report_handler(
        State(state),
        Path(("acme".to_string(), "widgets".to_string())),
    )
    .await;

    match result {
        Err(ReportRequestError::RepositoryNotFound { owner, name }) => {
            assert_eq!(owner, "acme");
            assert_eq!(name, "widgets");
        }
        other => panic!("expected RepositoryNotFound, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../ghillie-core/migrations")]
async fn report_handler_400s_on_blank_owner(pool: PgPool) {
    let reporting = Arc::new(ReportingService::new(
        pool.clone(),
        Arc::new(MockStatusModel::new()),
        None,
    ));
    let state = Arc::new(AppState::with_database(pool, reporting, test_metrics()));

    let response = generate_report_handler(
        State(state),
        Path(("  ".to_string(), "widgets".to_string())),
    )
    .await
    .expect("blank owner is a 400, not an error path")
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../ghillie-core/migrations")]
async fn report_handler_404s_for_repository_absent_from_catalogue(pool: PgPool) {
    let reporting = Arc::new(ReportingService::new(
        pool.clone(),
        Arc::new(MockStatusModel::new()),
        None,
    ));
    let state = Arc::new(AppState::with_database(pool, reporting, test_metrics()));

    let result = generate_report_handler(
        State(state),
        Path(("ghost".to_string(), "repo".to_string())),
    )
    .await;

    assert!(matches!(
        result,
        Err(ReportRequestError::RepositoryNotFound { .. })
    ));
}

#[sqlx::test(migrations = "../ghillie-core/migrations")]
async fn report_handler_204s_when_window_has_no_events(pool: PgPool) {
    sqlx::query("INSERT INTO repositories (external_id, owner, name) VALUES ($1, $2, $3)")
        .bind("acme/widgets")
        .bind("acme")
        .bind("widgets")
        .execute(&pool)
        .await
        .unwrap();

    let reporting = Arc::new(ReportingService::new(
        pool.clone(),
        Arc::new(MockStatusModel::new()),
        None,
    ));
    let state = Arc::new(AppState::with_database(pool, reporting, test_metrics()));

    let response = generate_report_handler(
        State(state),
        Path(("acme".to_string(), "widgets".to_string())),
    )
    .await
    .expect("an empty window is a 204, not an error")
    .into_response();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
