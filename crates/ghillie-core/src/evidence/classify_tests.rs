use super::*;

#[test]
fn label_wins_over_conflicting_text_prefix() {
    let labels = vec!["bug".to_string()];
    assert_eq!(classify_work_type("feat: add widget", &labels), WorkType::Bug);
}

#[test]
fn falls_back_to_conventional_commit_prefix() {
    assert_eq!(classify_work_type("fix: off-by-one", &[]), WorkType::Bug);
    assert_eq!(classify_work_type("feat: new export", &[]), WorkType::Feature);
    assert_eq!(classify_work_type("docs: update readme", &[]), WorkType::Documentation);
}

#[test]
fn unrecognised_text_and_labels_are_unknown() {
    assert_eq!(classify_work_type("bump version", &[]), WorkType::Unknown);
}

#[test]
fn label_matching_is_case_insensitive() {
    let labels = vec!["BUG".to_string()];
    assert_eq!(classify_work_type("investigate", &labels), WorkType::Bug);
}

#[test]
fn detects_github_generated_merge_commits() {
    assert!(is_merge_commit("Merge pull request #42 from acme/feature-x"));
    assert!(is_merge_commit("Merge branch 'main' into feature-x"));
    assert!(!is_merge_commit("fix: merge conflicting logic properly"));
}
