//! Process wiring for Ghillie: turns environment configuration into a
//! running HTTP server or a one-shot ingestion/reporting run.

pub mod config;
pub mod errors;
pub mod wiring;

pub use config::ServiceConfig;
pub use errors::ServiceError;
pub use wiring::{
    build_app_state, build_github_client, build_ingestion_worker, build_reporting_service,
    build_status_model, connect_database, run_ingest, run_report, run_serve,
};
