//! PostgreSQL implementation of the version history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LinkVersion, NewLinkVersion};
use crate::domain::repositories::VersionRepository;
use crate::error::AppError;

const VERSION_COLUMNS: &str =
    "id, link_id, destination, owner, created_by, modified_by, created, modified";

#[derive(sqlx::FromRow)]
struct VersionRow {
    id: i64,
    link_id: String,
    destination: String,
    owner: String,
    created_by: String,
    modified_by: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl From<VersionRow> for LinkVersion {
    fn from(r: VersionRow) -> Self {
        LinkVersion {
            id: r.id,
            link_id: r.link_id,
            destination: r.destination,
            owner: r.owner,
            created_by: r.created_by,
            modified_by: r.modified_by,
            created: r.created,
            modified: r.modified,
        }
    }
}

pub struct PgVersionRepository {
    pool: Arc<PgPool>,
}

impl PgVersionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_where(&self, column: &str, value: &str) -> Result<Vec<LinkVersion>, AppError> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM link_versions \
             WHERE {column} = $1 \
             ORDER BY created DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, VersionRow>(&sql)
            .bind(value)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(LinkVersion::from).collect())
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn append(&self, version: NewLinkVersion) -> Result<LinkVersion, AppError> {
        let sql = format!(
            "INSERT INTO link_versions (link_id, destination, owner, created_by, modified_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {VERSION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, VersionRow>(&sql)
            .bind(&version.link_id)
            .bind(&version.destination)
            .bind(&version.owner)
            .bind(&version.created_by)
            .bind(&version.modified_by)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LinkVersion>, AppError> {
        let sql = format!("SELECT {VERSION_COLUMNS} FROM link_versions WHERE id = $1");

        let row = sqlx::query_as::<_, VersionRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(LinkVersion::from))
    }

    async fn find_by_link_id(&self, link_id: &str) -> Result<Vec<LinkVersion>, AppError> {
        self.find_where("link_id", link_id).await
    }

    async fn find_by_created_by(&self, created_by: &str) -> Result<Vec<LinkVersion>, AppError> {
        self.find_where("created_by", created_by).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM link_versions WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
