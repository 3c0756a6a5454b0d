//! End-to-end tests for the on-demand reporting endpoint, run against a
//! container started with no `GHILLIE_DATABASE_URL` (health-only mode).

mod common;

use common::{http_client, TestContainer};

#[tokio::test]
async fn report_endpoint_404s_for_any_repository_in_health_only_mode() {
    let server = TestContainer::start().await;
    let client = http_client();

    let response = client
        .post(server.url("/reports/repositories/acme/widgets"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn ready_endpoint_is_ready_with_no_database_configured() {
    let server = TestContainer::start().await;
    let client = http_client();

    let response = client
        .get(server.url("/ready"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
}
