//! Optional secondary write path for reports, alongside the database.
//!
//! Grounded in the blob-storage adapter pattern this crate's ancestor
//! used for webhook payloads: a small async trait plus a filesystem
//! implementation, scoped-write, no partial files left behind on error.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::evidence::RepositoryMetadata;

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub markdown: String,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error writing report: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write(
        &self,
        repository: &RepositoryMetadata,
        report: &RenderedReport,
    ) -> Result<(), SinkError>;
}

/// Writes `{root}/{owner}/{name}/{iso-timestamp}.md` plus a `latest.md`
/// symlink-equivalent copy, so the most recent report is always reachable
/// at a stable path.
#[derive(Debug, Clone)]
pub struct FilesystemReportSink {
    root: std::path::PathBuf,
}

impl FilesystemReportSink {
    pub fn new(root: std::path::PathBuf) -> Self {
        Self { root }
    }

    fn repository_dir(&self, repository: &RepositoryMetadata) -> std::path::PathBuf {
        self.root.join(&repository.owner).join(&repository.name)
    }
}

#[async_trait]
impl ReportSink for FilesystemReportSink {
    async fn write(
        &self,
        repository: &RepositoryMetadata,
        report: &RenderedReport,
    ) -> Result<(), SinkError> {
        let dir = self.repository_dir(repository);
        tokio::fs::create_dir_all(&dir).await?;

        let dated_path = dir.join(format!("{}.md", report.generated_at.to_rfc3339()));
        let mut file = tokio::fs::File::create(&dated_path).await?;
        file.write_all(report.markdown.as_bytes()).await?;
        file.flush().await?;

        let latest_path = dir.join("latest.md");
        let mut latest = tokio::fs::File::create(&latest_path).await?;
        latest.write_all(report.markdown.as_bytes()).await?;
        latest.flush().await?;

        Ok(())
    }
}
