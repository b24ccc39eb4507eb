//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{LinkOrder, LinkQuery, LinkRepository};
use crate::error::AppError;

const LINK_COLUMNS: &str =
    "id, name, destination, link_id, owner, created_by, modified_by, created, modified";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    name: String,
    destination: String,
    link_id: String,
    owner: String,
    created_by: String,
    modified_by: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink::new(
            r.id,
            r.name,
            r.destination,
            r.link_id,
            r.owner,
            r.created_by,
            r.modified_by,
            r.created,
            r.modified,
        )
    }
}

/// PostgreSQL repository for shortlinks.
///
/// Name uniqueness is enforced by the `short_links_name_key` index; a
/// duplicate insert surfaces as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Byte-order collation, so pages match the in-memory store whatever the
/// database locale is.
fn order_clause(order: LinkOrder) -> &'static str {
    match order {
        LinkOrder::Name => r#"ORDER BY name COLLATE "C", id"#,
        LinkOrder::Destination => r#"ORDER BY destination COLLATE "C", id"#,
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            "INSERT INTO short_links (name, destination, link_id, owner, created_by, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.name)
            .bind(&new_link.destination)
            .bind(&new_link.link_id)
            .bind(&new_link.owner)
            .bind(&new_link.created_by)
            .bind(&new_link.modified_by)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            "UPDATE short_links \
             SET destination = $2, owner = $3, modified_by = $4, modified = now() \
             WHERE id = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link.id)
            .bind(&link.destination)
            .bind(&link.owner)
            .bind(&link.modified_by)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(ShortLink::from).ok_or_else(|| {
            AppError::not_found("Link not found", json!({ "id": link.id, "name": link.name }))
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE name = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn list(&self, query: LinkQuery) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links \
             WHERE ($1::text IS NULL OR owner = $1) \
             {} \
             LIMIT $2 OFFSET $3",
            order_clause(query.order)
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(query.owner)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ShortLink::from).collect())
    }

    async fn count(&self, owner: Option<String>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM short_links WHERE ($1::text IS NULL OR owner = $1)",
        )
        .bind(owner)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
