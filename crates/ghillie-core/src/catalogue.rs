//! Read-only query surface over the estate/project catalogue. The
//! catalogue itself (`projects`, `components`, `repositories`) is
//! populated by an out-of-scope importer; this module only queries it,
//! on behalf of the noise compiler. The evidence bundler joins
//! `components`/`reports` directly for project-scope coverage
//! exclusion rather than going through this store.

use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: uuid::Uuid,
    pub estate_id: Option<String>,
    pub name: String,
    pub noise_config: serde_json::Value,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentRecord {
    pub id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub repository_id: uuid::Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RepositoryRecord {
    pub id: uuid::Uuid,
    pub external_id: String,
    pub owner: String,
    pub name: String,
}

/// Runtime view consumed by the ingestion worker and the evidence
/// bundler, mirroring the catalogue importer's repository shape.
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub external_id: String,
    pub owner: String,
    pub name: String,
    pub default_branch: String,
    pub ingestion_enabled: bool,
    pub documentation_paths: Vec<String>,
    pub estate_id: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RepositoryInfoRow {
    external_id: String,
    owner: String,
    name: String,
    default_branch: String,
    ingestion_enabled: bool,
    documentation_paths: Vec<String>,
    estate_id: Option<String>,
}

impl From<RepositoryInfoRow> for RepositoryInfo {
    fn from(row: RepositoryInfoRow) -> Self {
        Self {
            external_id: row.external_id,
            owner: row.owner,
            name: row.name,
            default_branch: row.default_branch,
            ingestion_enabled: row.ingestion_enabled,
            documentation_paths: row.documentation_paths,
            estate_id: row.estate_id,
        }
    }
}

pub struct CatalogueStore {
    pool: PgPool,
}

impl CatalogueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_ingestion_enabled_repositories(&self) -> Result<Vec<RepositoryInfo>, sqlx::Error> {
        let rows: Vec<RepositoryInfoRow> = sqlx::query_as(
            r#"
            SELECT external_id, owner, name, default_branch, ingestion_enabled,
                   documentation_paths, estate_id
            FROM repositories
            WHERE ingestion_enabled
            ORDER BY owner, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RepositoryInfo::from).collect())
    }

    pub async fn get_repository(&self, external_id: &str) -> Result<Option<RepositoryInfo>, sqlx::Error> {
        let row: Option<RepositoryInfoRow> = sqlx::query_as(
            r#"
            SELECT external_id, owner, name, default_branch, ingestion_enabled,
                   documentation_paths, estate_id
            FROM repositories
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RepositoryInfo::from))
    }

    /// Looks a repository up by owner/name, the shape an HTTP caller
    /// addresses a repository by rather than its catalogue `external_id`.
    pub async fn get_repository_by_owner_and_name(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<RepositoryInfo>, sqlx::Error> {
        let row: Option<RepositoryInfoRow> = sqlx::query_as(
            r#"
            SELECT external_id, owner, name, default_branch, ingestion_enabled,
                   documentation_paths, estate_id
            FROM repositories
            WHERE owner = $1 AND name = $2
            "#,
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RepositoryInfo::from))
    }

    /// Every project's noise configuration for a repository, joined
    /// through `components`. A repository with no catalogued project
    /// membership yields an empty vector, not an error.
    pub async fn noise_configs_for_repository(
        &self,
        repo_external_id: &str,
    ) -> Result<Vec<serde_json::Value>, sqlx::Error> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            r#"
            SELECT p.noise_config
            FROM projects p
            JOIN components c ON c.project_id = p.id
            JOIN repositories r ON r.id = c.repository_id
            WHERE r.external_id = $1
            "#,
        )
        .bind(repo_external_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(config,)| config).collect())
    }
}
