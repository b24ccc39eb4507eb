//! Repository trait for per-link click counters.

use crate::domain::entities::ClickStats;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStatsRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ClickStats>, AppError>;

    async fn find_by_link_id(&self, link_id: &str) -> Result<Option<ClickStats>, AppError>;

    /// Adds one click to the counter for `link_id`, creating it with a count
    /// of 1 if it does not exist yet.
    ///
    /// Implementations perform the read and the write as one atomic step.
    async fn increment(&self, link_id: &str) -> Result<ClickStats, AppError>;

    /// Removes a counter. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
