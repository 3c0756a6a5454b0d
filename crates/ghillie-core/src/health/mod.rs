//! On-demand ingestion health and lag reporting, computed from
//! `github_ingestion_offsets` rows rather than a separate metrics store.

mod lag;

pub use lag::{IngestionHealthConfig, IngestionHealthService, IngestionLagMetrics};

#[path = "lag_tests.rs"]
#[cfg(test)]
mod lag_tests;
