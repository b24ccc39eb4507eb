//! PostgreSQL implementation of the site configuration repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::SiteConfig;
use crate::domain::repositories::SiteConfigRepository;
use crate::error::AppError;

/// The configuration is a single row with id 1.
const SITE_CONFIG_ID: i64 = 1;

#[derive(sqlx::FromRow)]
struct SiteConfigRow {
    id: i64,
    domain: String,
    admin_users: Option<String>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl From<SiteConfigRow> for SiteConfig {
    fn from(r: SiteConfigRow) -> Self {
        SiteConfig {
            id: r.id,
            domain: r.domain,
            admin_users: r.admin_users,
            created: r.created,
            modified: r.modified,
        }
    }
}

pub struct PgSiteConfigRepository {
    pool: Arc<PgPool>,
}

impl PgSiteConfigRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteConfigRepository for PgSiteConfigRepository {
    async fn get(&self) -> Result<Option<SiteConfig>, AppError> {
        let row = sqlx::query_as::<_, SiteConfigRow>(
            "SELECT id, domain, admin_users, created, modified FROM site_config WHERE id = $1",
        )
        .bind(SITE_CONFIG_ID)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(SiteConfig::from))
    }

    async fn save(
        &self,
        domain: String,
        admin_users: Option<String>,
    ) -> Result<SiteConfig, AppError> {
        let row = sqlx::query_as::<_, SiteConfigRow>(
            r#"
            INSERT INTO site_config (id, domain, admin_users)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET domain = EXCLUDED.domain,
                          admin_users = EXCLUDED.admin_users,
                          modified = now()
            RETURNING id, domain, admin_users, created, modified
            "#,
        )
        .bind(SITE_CONFIG_ID)
        .bind(domain)
        .bind(admin_users)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
