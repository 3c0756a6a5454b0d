//! Evidence bundling: aggregate Silver facts for a repository and time
//! window into the structure the status model reasons over.

mod bundler;
mod classify;
mod models;

pub use bundler::{BundleError, EvidenceBundler};
pub use classify::classify_work_type;
pub use models::{
    CommitEvidence, DocumentationEvidence, IssueEvidence, PreviousReportSummary,
    PullRequestEvidence, RepositoryEvidenceBundle, RepositoryMetadata, ReportStatus, WorkType,
    WorkTypeGrouping,
};

#[path = "classify_tests.rs"]
#[cfg(test)]
mod classify_tests;
