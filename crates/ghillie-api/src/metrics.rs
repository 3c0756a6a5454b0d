//! Prometheus metrics exposed at `GET /metrics`: report generation
//! counts and latency.

use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};

#[derive(Debug)]
pub struct ApiMetrics {
    pub ingestion_runs_total: IntCounter,
    pub ingestion_events_total: IntCounter,
    pub reports_generated_total: IntCounter,
    pub reports_empty_total: IntCounter,
    pub reports_failed_total: IntCounter,
    pub report_latency_seconds: Histogram,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            ingestion_runs_total: register_int_counter!(
                "ghillie_ingestion_runs_total",
                "Total ingestion runs started"
            )?,
            ingestion_events_total: register_int_counter!(
                "ghillie_ingestion_events_total",
                "Total raw events ingested across all repositories"
            )?,
            reports_generated_total: register_int_counter!(
                "ghillie_reports_generated_total",
                "Total reports persisted"
            )?,
            reports_empty_total: register_int_counter!(
                "ghillie_reports_empty_total",
                "Report requests that produced no report because the window had no events"
            )?,
            reports_failed_total: register_int_counter!(
                "ghillie_reports_failed_total",
                "Report requests that failed"
            )?,
            report_latency_seconds: register_histogram!(
                "ghillie_report_latency_seconds",
                "Time to bundle evidence, invoke the status model, and persist a report",
                vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
            )?,
        })
    }
}
