//! PostgreSQL implementation of the click counter repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ClickStats;
use crate::domain::repositories::ClickStatsRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickStatsRow {
    id: i64,
    link_id: String,
    count: i64,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl From<ClickStatsRow> for ClickStats {
    fn from(r: ClickStatsRow) -> Self {
        ClickStats {
            id: r.id,
            link_id: r.link_id,
            count: r.count,
            created: r.created,
            modified: r.modified,
        }
    }
}

/// Click counters, one row per `link_id`.
///
/// Increments are a single upsert, so concurrent clicks are never lost.
pub struct PgClickStatsRepository {
    pool: Arc<PgPool>,
}

impl PgClickStatsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickStatsRepository for PgClickStatsRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ClickStats>, AppError> {
        let row = sqlx::query_as::<_, ClickStatsRow>(
            "SELECT id, link_id, count, created, modified FROM click_stats WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ClickStats::from))
    }

    async fn find_by_link_id(&self, link_id: &str) -> Result<Option<ClickStats>, AppError> {
        let row = sqlx::query_as::<_, ClickStatsRow>(
            "SELECT id, link_id, count, created, modified FROM click_stats WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ClickStats::from))
    }

    async fn increment(&self, link_id: &str) -> Result<ClickStats, AppError> {
        let row = sqlx::query_as::<_, ClickStatsRow>(
            r#"
            INSERT INTO click_stats (link_id, count)
            VALUES ($1, 1)
            ON CONFLICT (link_id)
            DO UPDATE SET count = click_stats.count + 1, modified = now()
            RETURNING id, link_id, count, created, modified
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM click_stats WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
