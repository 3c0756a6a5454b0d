//! HTTP surface for Ghillie: liveness/readiness probes, on-demand report
//! generation, and a Prometheus scrape endpoint. `create_router` and
//! `start_server` are split apart so the binary crate only has to build
//! an [`AppState`] and call [`start_server`].

pub mod config;
pub mod errors;
pub mod metrics;
pub mod responses;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ghillie_core::catalogue::CatalogueStore;
use ghillie_core::reporting::ReportingService;
use sqlx::PgPool;
use tokio::signal;
use tracing::{info, warn};

use config::ServerConfig;
use errors::{ReportRequestError, ServiceError};
use responses::{HealthResponse, ReadinessResponse, ReportMetadataResponse};

pub use metrics::ApiMetrics;

/// Database-backed capabilities, absent entirely in health-only mode
/// (`GHILLIE_DATABASE_URL` unset).
struct DatabaseState {
    pool: PgPool,
    catalogue: CatalogueStore,
    reporting: Arc<ReportingService>,
}

pub struct AppState {
    db: Option<DatabaseState>,
    metrics: Arc<ApiMetrics>,
}

impl AppState {
    /// Health-only state: `/health` and `/ready` work, `/reports/...`
    /// always 404s because no repository can ever be known.
    pub fn health_only(metrics: Arc<ApiMetrics>) -> Self {
        Self { db: None, metrics }
    }

    pub fn with_database(pool: PgPool, reporting: Arc<ReportingService>, metrics: Arc<ApiMetrics>) -> Self {
        let catalogue = CatalogueStore::new(pool.clone());
        Self {
            db: Some(DatabaseState {
                pool,
                catalogue,
                reporting,
            }),
            metrics,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route(
            "/reports/repositories/{owner}/{name}",
            post(generate_report_handler),
        )
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServiceError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServiceError::BindFailed {
            address: format!("{}:{}", config.host, config.port),
            message: format!("{e}"),
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: addr.to_string(),
            message: e.to_string(),
        })?;

    info!(%addr, "ghillie-api listening");

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness means the process can reach its database when one is
/// configured; health-only deployments are always ready since they have
/// nothing to be ready for beyond having started.
async fn ready_handler(State(state): State<Arc<AppState>>) -> Response {
    if let Some(db) = &state.db {
        if let Err(err) = sqlx::query("SELECT 1").execute(&db.pool).await {
            warn!(error = %err, "readiness check failed to reach the database");
            let body = serde_json::json!({
                "title": "not_ready",
                "description": "database is unreachable",
            });
            return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
        }
    }

    Json(ReadinessResponse { status: "ready" }).into_response()
}

async fn generate_report_handler(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Response, ReportRequestError> {
    let Some(db) = &state.db else {
        return Err(ReportRequestError::RepositoryNotFound { owner, name });
    };

    if owner.trim().is_empty() || name.trim().is_empty() {
        let body = serde_json::json!({
            "title": "invalid_repository",
            "description": "owner and name must both be non-empty",
        });
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let repo = db
        .catalogue
        .get_repository_by_owner_and_name(&owner, &name)
        .await
        .map_err(|e| ReportRequestError::Reporting(e.into()))?
        .ok_or(ReportRequestError::RepositoryNotFound {
            owner: owner.clone(),
            name: name.clone(),
        })?;

    let started = Instant::now();
    let outcome = db.reporting.run_for_repository(&repo.external_id).await;
    let elapsed = started.elapsed().as_secs_f64();
    state.metrics.report_latency_seconds.observe(elapsed);

    match outcome {
        Ok(Some(outcome)) => {
            state.metrics.reports_generated_total.inc();
            let body = ReportMetadataResponse {
                report_id: outcome.report_id,
                repository: format!("{owner}/{name}"),
                window_start: outcome.window_start,
                window_end: outcome.window_end,
                generated_at: chrono::Utc::now(),
                status: status_label(outcome.status),
                model: outcome.model,
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Ok(None) => {
            state.metrics.reports_empty_total.inc();
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(err) => {
            state.metrics.reports_failed_total.inc();
            Err(ReportRequestError::Reporting(err))
        }
    }
}

fn status_label(status: ghillie_core::evidence::ReportStatus) -> String {
    use ghillie_core::evidence::ReportStatus;
    match status {
        ReportStatus::OnTrack => "on_track",
        ReportStatus::AtRisk => "at_risk",
        ReportStatus::Blocked => "blocked",
        ReportStatus::Unknown => "unknown",
    }
    .to_string()
}

async fn metrics_handler() -> Response {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %err, "failed to encode prometheus metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        StatusCode::OK,
        [("content-type", encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

#[path = "lib_tests.rs"]
#[cfg(test)]
mod lib_tests;
