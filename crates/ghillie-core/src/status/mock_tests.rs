use super::*;
use crate::evidence::{RepositoryMetadata, WorkTypeGrouping};
use chrono::Utc;

fn empty_bundle() -> RepositoryEvidenceBundle {
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
        commits: vec![],
        pull_requests: vec![],
        issues: vec![],
        documentation_changes: vec![],
        work_type_groupings: vec![],
        event_fact_ids: vec![],
        generated_at: None,
    }
}

#[tokio::test]
async fn empty_window_with_no_history_is_unknown() {
    let model = MockStatusModel::new();
    let result = model.summarize_repository(&empty_bundle()).await.unwrap();
    assert_eq!(result.status, ReportStatus::Unknown);
}

#[tokio::test]
async fn dominant_bug_count_marks_at_risk() {
    let mut bundle = empty_bundle();
    bundle.work_type_groupings.push(WorkTypeGrouping {
        work_type: WorkType::Bug,
        commit_count: 3,
        pr_count: 0,
        issue_count: 2,
        sample_titles: vec!["fix: crash on startup".into()],
    });
    let model = MockStatusModel::new();
    let result = model.summarize_repository(&bundle).await.unwrap();
    assert_eq!(result.status, ReportStatus::AtRisk);
    assert!(result.risks.iter().any(|r| r.contains("2 bug issues require attention")));
}

#[tokio::test]
async fn feature_highlight_leads_with_pr_count_then_sample_titles() {
    let mut bundle = empty_bundle();
    bundle.work_type_groupings.push(WorkTypeGrouping {
        work_type: WorkType::Feature,
        commit_count: 0,
        pr_count: 8,
        issue_count: 0,
        sample_titles: (0..8).map(|i| format!("feat: item {i}")).collect(),
    });
    let model = MockStatusModel::new();
    let result = model.summarize_repository(&bundle).await.unwrap();
    assert_eq!(result.highlights[0], "Delivered 8 feature PRs");
    assert_eq!(result.highlights.len(), 3);
}

#[tokio::test]
async fn highlights_are_capped_at_five() {
    let mut bundle = empty_bundle();
    for _ in 0..8 {
        bundle.work_type_groupings.push(WorkTypeGrouping {
            work_type: WorkType::Feature,
            commit_count: 0,
            pr_count: 1,
            issue_count: 0,
            sample_titles: vec!["feat: item".into()],
        });
    }
    let model = MockStatusModel::new();
    let result = model.summarize_repository(&bundle).await.unwrap();
    assert_eq!(result.highlights.len(), 5);
}

#[tokio::test]
async fn ongoing_risks_are_prefixed_and_capped_at_two() {
    use crate::evidence::PreviousReportSummary;

    let mut bundle = empty_bundle();
    bundle.previous_reports.push(PreviousReportSummary {
        report_id: "r1".into(),
        window_start: Utc::now(),
        window_end: Utc::now(),
        status: ReportStatus::AtRisk,
        highlights: vec![],
        risks: vec!["risk a".into(), "risk b".into(), "risk c".into()],
        event_count: 0,
    });
    let model = MockStatusModel::new();
    let result = model.summarize_repository(&bundle).await.unwrap();
    let ongoing: Vec<_> = result.risks.iter().filter(|r| r.starts_with("(Ongoing)")).collect();
    assert_eq!(ongoing.len(), 2);
}
