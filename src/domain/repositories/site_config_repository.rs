//! Repository trait for the site configuration singleton.

use crate::domain::entities::SiteConfig;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteConfigRepository: Send + Sync {
    /// Returns the configuration, if one has been stored.
    async fn get(&self) -> Result<Option<SiteConfig>, AppError>;

    /// Creates or replaces the configuration.
    async fn save(&self, domain: String, admin_users: Option<String>)
    -> Result<SiteConfig, AppError>;
}
