use super::*;
use crate::evidence::{ReportStatus, RepositoryMetadata};
use chrono::Utc;

fn bundle_with_events(count: usize) -> RepositoryEvidenceBundle {
    RepositoryEvidenceBundle {
        repository: RepositoryMetadata {
            id: "1".into(),
            owner: "acme".into(),
            name: "widgets".into(),
            default_branch: "main".into(),
            estate_id: None,
            documentation_paths: vec![],
        },
        window_start: Utc::now(),
        window_end: Utc::now(),
        previous_reports: vec![],
        commits: (0..count)
            .map(|i| crate::evidence::CommitEvidence {
                sha: format!("sha-{i}"),
                message: None,
                author_name: None,
                author_email: None,
                committed_at: None,
                work_type: crate::evidence::WorkType::Unknown,
                is_merge_commit: false,
            })
            .collect(),
        pull_requests: vec![],
        issues: vec![],
        documentation_changes: vec![],
        work_type_groupings: vec![],
        event_fact_ids: vec![],
        generated_at: None,
    }
}

fn result(summary: &str, highlights: Vec<&str>) -> RepositoryStatusResult {
    RepositoryStatusResult {
        status: ReportStatus::OnTrack,
        summary: summary.to_string(),
        highlights: highlights.into_iter().map(String::from).collect(),
        risks: vec![],
        next_steps: vec![],
    }
}

#[test]
fn empty_summary_is_flagged() {
    let validation = validate_repository_report(&bundle_with_events(1), &result("", vec![]));
    assert!(validation.issues.contains(&ReportValidationIssue::EmptySummary));
}

#[test]
fn truncated_summary_is_flagged() {
    let validation =
        validate_repository_report(&bundle_with_events(1), &result("work is ongoing...", vec![]));
    assert!(validation.issues.contains(&ReportValidationIssue::TruncatedSummary));
}

#[test]
fn highlights_far_exceeding_event_count_are_implausible() {
    let validation = validate_repository_report(
        &bundle_with_events(1),
        &result(
            "steady state",
            vec!["a", "b", "c", "d", "e", "f"],
        ),
    );
    assert!(validation
        .issues
        .contains(&ReportValidationIssue::ImplausibleHighlights));
}

#[test]
fn plausible_report_has_no_issues() {
    let validation = validate_repository_report(
        &bundle_with_events(3),
        &result("steady progress", vec!["shipped the new widget"]),
    );
    assert!(validation.is_valid());
}
