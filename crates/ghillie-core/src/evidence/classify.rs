//! Work-type classification shared by commits, pull requests, and issues.
//!
//! Labels take priority over text heuristics: a `bug` label wins even if
//! the title also contains the word "feature". Text heuristics fall back
//! to conventional-commit-style prefixes when no label matches.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::WorkType;

static MERGE_COMMIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^merge (pull request #\d+|branch '[^']+'|remote-tracking branch)")
        .expect("static regex is valid")
});

/// True if `message` looks like an automatically generated merge commit
/// rather than authored work.
pub fn is_merge_commit(message: &str) -> bool {
    MERGE_COMMIT_RE.is_match(message.trim())
}

const DOC_LABELS: &[&str] = &["documentation", "docs"];
const BUG_LABELS: &[&str] = &["bug", "bugfix", "defect"];
const FEATURE_LABELS: &[&str] = &["enhancement", "feature"];
const REFACTOR_LABELS: &[&str] = &["refactor", "refactoring"];
const CHORE_LABELS: &[&str] = &["chore", "maintenance", "dependencies"];

/// Classify a title/message plus its labels into a [`WorkType`]. Labels
/// are matched case-insensitively and take priority; title/message
/// prefixes follow conventional-commit convention as a fallback.
pub fn classify_work_type(text: &str, labels: &[String]) -> WorkType {
    let lowered_labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();

    if lowered_labels.iter().any(|l| DOC_LABELS.contains(&l.as_str())) {
        return WorkType::Documentation;
    }
    if lowered_labels.iter().any(|l| BUG_LABELS.contains(&l.as_str())) {
        return WorkType::Bug;
    }
    if lowered_labels.iter().any(|l| FEATURE_LABELS.contains(&l.as_str())) {
        return WorkType::Feature;
    }
    if lowered_labels
        .iter()
        .any(|l| REFACTOR_LABELS.contains(&l.as_str()))
    {
        return WorkType::Refactor;
    }
    if lowered_labels.iter().any(|l| CHORE_LABELS.contains(&l.as_str())) {
        return WorkType::Chore;
    }

    let lowered_text = text.to_lowercase();
    let prefix = lowered_text.split(':').next().unwrap_or("").trim();
    match prefix {
        "fix" | "bugfix" => WorkType::Bug,
        "feat" | "feature" => WorkType::Feature,
        "refactor" => WorkType::Refactor,
        "chore" | "build" | "ci" => WorkType::Chore,
        "docs" | "doc" => WorkType::Documentation,
        _ => WorkType::Unknown,
    }
}
