//! Shared fixtures for Ghillie API integration tests.

use std::sync::{Arc, OnceLock};

use ghillie_api::{ApiMetrics, AppState};
use ghillie_core::catalogue::CatalogueStore;
use ghillie_core::reporting::ReportingService;
use ghillie_core::status::MockStatusModel;
use sqlx::PgPool;

/// Prometheus registers metrics in a process-global registry; every test
/// binary in this crate shares one `ApiMetrics` instead of each test
/// constructing its own.
#[allow(dead_code)]
pub fn test_metrics() -> Arc<ApiMetrics> {
    static METRICS: OnceLock<Arc<ApiMetrics>> = OnceLock::new();
    METRICS
        .get_or_init(|| Arc::new(ApiMetrics::new().expect("metrics register exactly once")))
        .clone()
}

/// Builds an [`AppState`] wired to `pool` with a mock status model, the
/// shape every database-backed test in this crate starts from.
#[allow(dead_code)]
pub fn app_state_with_database(pool: PgPool) -> Arc<AppState> {
    let reporting = Arc::new(ReportingService::new(
        pool.clone(),
        Arc::new(MockStatusModel::new()),
        None,
    ));
    Arc::new(AppState::with_database(pool, reporting, test_metrics()))
}

/// Inserts a catalogue row for `owner/name` and returns its external id.
#[allow(dead_code)]
pub async fn seed_repository(pool: &PgPool, owner: &str, name: &str) -> String {
    let external_id = format!("{owner}/{name}");
    sqlx::query("INSERT INTO repositories (external_id, owner, name) VALUES ($1, $2, $3)")
        .bind(&external_id)
        .bind(owner)
        .bind(name)
        .execute(pool)
        .await
        .expect("seed repository");
    external_id
}

#[allow(dead_code)]
pub fn catalogue(pool: PgPool) -> CatalogueStore {
    CatalogueStore::new(pool)
}
