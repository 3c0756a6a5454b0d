//! The `StatusModel` trait every status-generation backend implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ErrorCategory;
use crate::evidence::{ReportStatus, RepositoryEvidenceBundle};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryStatusResult {
    pub status: ReportStatus,
    pub summary: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub next_steps: Vec<String>,
}

impl RepositoryStatusResult {
    /// Flatten into the machine-summary shape persisted on the `reports`
    /// row (status + lists, no prose beyond `summary`).
    pub fn to_machine_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "highlights": self.highlights,
            "risks": self.risks,
            "next_steps": self.next_steps,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelInvocationMetrics {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum StatusModelError {
    #[error("status model request timed out")]
    Timeout,
    #[error("status model endpoint returned HTTP {status}")]
    Http { status: u16 },
    #[error("status model rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("status model response did not match the expected schema: {message}")]
    SchemaDrift { message: String },
    #[error("status model configuration error: {message}")]
    Config { message: String },
}

impl StatusModelError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            StatusModelError::Timeout | StatusModelError::RateLimited { .. } => {
                ErrorCategory::Transient
            }
            StatusModelError::Http { status } if *status >= 500 => ErrorCategory::Transient,
            StatusModelError::Http { .. } => ErrorCategory::ClientError,
            StatusModelError::SchemaDrift { .. } => ErrorCategory::SchemaDrift,
            StatusModelError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.error_category(), ErrorCategory::Transient)
    }
}

#[async_trait]
pub trait StatusModel: Send + Sync {
    async fn summarize_repository(
        &self,
        evidence: &RepositoryEvidenceBundle,
    ) -> Result<RepositoryStatusResult, StatusModelError>;

    /// Metrics from the most recent invocation, if the backend tracks
    /// any (the mock model always returns `None`).
    fn last_invocation_metrics(&self) -> Option<ModelInvocationMetrics> {
        None
    }

    /// Identifier recorded alongside a generated report (e.g. `"mock"`
    /// or an OpenAI model name) so callers can tell which backend
    /// produced it without reaching into backend-specific config.
    fn model_name(&self) -> &str;
}
