//! Integration tests for `/health` and `/ready` over the real router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::app_state_with_database;
use ghillie_api::{create_router, AppState};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn health_endpoint_returns_200_with_no_database_configured() {
    let state = Arc::new(AppState::health_only(common::test_metrics()));
    let app = create_router(state);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn ready_endpoint_is_ready_in_health_only_mode() {
    let state = Arc::new(AppState::health_only(common::test_metrics()));
    let app = create_router(state);

    let request = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../ghillie-core/migrations")]
async fn ready_endpoint_is_ready_when_database_is_reachable(pool: PgPool) {
    let state = app_state_with_database(pool);
    let app = create_router(state);

    let request = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text_format() {
    let state = Arc::new(AppState::health_only(common::test_metrics()));
    let app = create_router(state);

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
