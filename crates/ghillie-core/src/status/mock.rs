//! Deterministic, dependency-free status model: no network calls, a
//! fixed priority order and fixed caps on every list it returns. Useful
//! both as a default for environments without an LLM credential and as
//! a baseline to diff LLM output against.

use async_trait::async_trait;

use crate::evidence::{ReportStatus, RepositoryEvidenceBundle, WorkType};

use super::protocol::{RepositoryStatusResult, StatusModel, StatusModelError};

const MAX_HIGHLIGHTS: usize = 5;
const MAX_RISKS: usize = 5;
const MAX_ONGOING_RISKS: usize = 2;
const MAX_NEXT_STEPS: usize = 5;

#[derive(Debug, Default, Clone, Copy)]
pub struct MockStatusModel;

impl MockStatusModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatusModel for MockStatusModel {
    async fn summarize_repository(
        &self,
        evidence: &RepositoryEvidenceBundle,
    ) -> Result<RepositoryStatusResult, StatusModelError> {
        let status = determine_status(evidence);
        Ok(RepositoryStatusResult {
            summary: generate_summary(evidence, status),
            highlights: extract_highlights(evidence),
            risks: extract_risks(evidence, status),
            next_steps: suggest_next_steps(evidence, status),
            status,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn has_previous_risks(evidence: &RepositoryEvidenceBundle) -> bool {
    evidence.previous_reports.first().is_some_and(|r| {
        !r.risks.is_empty() && matches!(r.status, ReportStatus::AtRisk | ReportStatus::Blocked)
    })
}

fn count_work_by_type(evidence: &RepositoryEvidenceBundle, work_type: WorkType) -> usize {
    evidence
        .work_type_groupings
        .iter()
        .find(|g| g.work_type == work_type)
        .map(|g| g.commit_count + g.pr_count + g.issue_count)
        .unwrap_or(0)
}

fn determine_status(evidence: &RepositoryEvidenceBundle) -> ReportStatus {
    if evidence.total_event_count() == 0 {
        return ReportStatus::Unknown;
    }

    if has_previous_risks(evidence) {
        return ReportStatus::AtRisk;
    }

    let bug_count = count_work_by_type(evidence, WorkType::Bug);
    let feature_count = count_work_by_type(evidence, WorkType::Feature);

    if bug_count > feature_count && bug_count > 0 {
        ReportStatus::AtRisk
    } else {
        ReportStatus::OnTrack
    }
}

fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn generate_summary(evidence: &RepositoryEvidenceBundle, status: ReportStatus) -> String {
    if evidence.total_event_count() == 0 {
        return format!(
            "No activity recorded for {} in this window.",
            evidence.repository.slug()
        );
    }

    let commits = pluralize(evidence.commits.len(), "commit", "commits");
    let prs = pluralize(evidence.pull_requests.len(), "pull request", "pull requests");
    let issues = pluralize(evidence.issues.len(), "issue", "issues");

    let status_phrase = match status {
        ReportStatus::OnTrack => "progressing on track",
        ReportStatus::AtRisk => "showing signs of risk",
        ReportStatus::Blocked => "blocked",
        ReportStatus::Unknown => "of unclear status",
    };

    format!(
        "{} is {status_phrase}, with {commits}, {prs}, and {issues} in this window.",
        evidence.repository.slug()
    )
}

fn extract_highlights(evidence: &RepositoryEvidenceBundle) -> Vec<String> {
    let mut highlights = Vec::new();

    for grouping in &evidence.work_type_groupings {
        match grouping.work_type {
            WorkType::Feature => {
                if grouping.pr_count > 0 {
                    let pr_word = if grouping.pr_count == 1 { "PR" } else { "PRs" };
                    highlights.push(format!("Delivered {} feature {pr_word}", grouping.pr_count));
                }
                highlights.extend(grouping.sample_titles.iter().take(2).cloned());
            }
            WorkType::Documentation => {
                if grouping.commit_count + grouping.pr_count > 0 {
                    highlights.push("Updated documentation".to_string());
                }
            }
            _ => {}
        }
    }

    highlights.truncate(MAX_HIGHLIGHTS);
    highlights
}

fn extract_risks(evidence: &RepositoryEvidenceBundle, _status: ReportStatus) -> Vec<String> {
    let mut risks = Vec::new();

    if let Some(previous) = evidence.previous_reports.first() {
        for risk in previous.risks.iter().take(MAX_ONGOING_RISKS) {
            risks.push(format!("(Ongoing) {risk}"));
        }
    }

    for grouping in &evidence.work_type_groupings {
        if grouping.work_type == WorkType::Bug && grouping.issue_count > 0 {
            let issue_word = if grouping.issue_count == 1 { "issue" } else { "issues" };
            risks.push(format!("{} bug {issue_word} require attention", grouping.issue_count));
        }
    }

    risks.truncate(MAX_RISKS);
    risks
}

fn add_open_items_step(steps: &mut Vec<String>, evidence: &RepositoryEvidenceBundle) {
    let open_prs = evidence
        .pull_requests
        .iter()
        .filter(|p| p.state == "open")
        .count();
    let open_issues = evidence
        .issues
        .iter()
        .filter(|i| i.state == "open")
        .count();

    if open_prs > 0 {
        steps.push(format!(
            "Review {}",
            pluralize(open_prs, "open pull request", "open pull requests")
        ));
    }
    if open_issues > 0 {
        steps.push(format!(
            "Triage {}",
            pluralize(open_issues, "open issue", "open issues")
        ));
    }
}

fn suggest_next_steps(evidence: &RepositoryEvidenceBundle, status: ReportStatus) -> Vec<String> {
    let mut steps = Vec::new();

    match status {
        ReportStatus::AtRisk => {
            steps.push("Investigate the cause of increased risk before the next window".into());
        }
        ReportStatus::Unknown => {
            steps.push("Confirm ingestion is enabled and the repository remains active".into());
        }
        _ => {}
    }

    add_open_items_step(&mut steps, evidence);

    steps.truncate(MAX_NEXT_STEPS);
    steps
}
