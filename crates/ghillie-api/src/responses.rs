//! Response payload types for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
}

/// Body for a successful `POST /reports/repositories/{owner}/{name}`,
/// matching the shape `spec.md` §6 documents.
#[derive(Debug, Serialize)]
pub struct ReportMetadataResponse {
    pub report_id: uuid::Uuid,
    pub repository: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub status: String,
    pub model: String,
}
