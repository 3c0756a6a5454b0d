//! Post-generation sanity checks on a status model's output. These never
//! block a report from being persisted; they're surfaced as warnings so
//! an operator can see when the model is drifting.

use crate::evidence::RepositoryEvidenceBundle;
use crate::status::RepositoryStatusResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportValidationIssue {
    EmptySummary,
    TruncatedSummary,
    ImplausibleHighlights,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportValidationResult {
    pub issues: Vec<ReportValidationIssue>,
}

impl ReportValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn validate_repository_report(
    bundle: &RepositoryEvidenceBundle,
    result: &RepositoryStatusResult,
) -> ReportValidationResult {
    let mut issues = Vec::new();

    if check_empty_summary(result) {
        issues.push(ReportValidationIssue::EmptySummary);
    }
    if check_truncated_summary(result) {
        issues.push(ReportValidationIssue::TruncatedSummary);
    }
    if check_implausible_highlights(bundle, result) {
        issues.push(ReportValidationIssue::ImplausibleHighlights);
    }

    ReportValidationResult { issues }
}

fn check_empty_summary(result: &RepositoryStatusResult) -> bool {
    result.summary.trim().is_empty()
}

fn check_truncated_summary(result: &RepositoryStatusResult) -> bool {
    let trimmed = result.summary.trim_end();
    trimmed.ends_with("...") || trimmed.ends_with('\u{2026}')
}

const IMPLAUSIBLE_HIGHLIGHT_MULTIPLIER: usize = 5;

fn check_implausible_highlights(
    bundle: &RepositoryEvidenceBundle,
    result: &RepositoryStatusResult,
) -> bool {
    let threshold = IMPLAUSIBLE_HIGHLIGHT_MULTIPLIER * bundle.total_event_count().max(1);
    result.highlights.len() > threshold
}
