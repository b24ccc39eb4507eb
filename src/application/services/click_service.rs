//! Click counting.

use std::sync::Arc;

use crate::domain::entities::ClickStats;
use crate::domain::external_key::{self, EntityKind};
use crate::domain::repositories::ClickStatsRepository;
use crate::error::AppError;

/// Per-link click counter. A counter is created on the first click.
pub struct ClickCounter<C: ClickStatsRepository> {
    repository: Arc<C>,
}

impl<C: ClickStatsRepository> Clone for ClickCounter<C> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<C: ClickStatsRepository> ClickCounter<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    /// Counts one click for `link_id`.
    pub async fn record(&self, link_id: &str) -> Result<ClickStats, AppError> {
        let stats = self.repository.increment(link_id).await?;
        metrics::counter!("shortlinks_clicks_total").increment(1);
        Ok(stats)
    }

    /// Click total for `link_id`; 0 when it was never clicked or the lookup fails.
    pub async fn clicks(&self, link_id: &str) -> i64 {
        self.stats(link_id).await.map_or(0, |s| s.count)
    }

    pub async fn stats(&self, link_id: &str) -> Option<ClickStats> {
        self.repository
            .find_by_link_id(link_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, link_id, "Failed to load click stats");
                None
            })
    }

    pub async fn get_by_external_key(&self, key: &str) -> Option<ClickStats> {
        let id = external_key::decode_for(EntityKind::ClickStats, key)?;
        self.repository.find_by_id(id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, id, "Failed to load click stats");
            None
        })
    }

    /// Deletes the counter for `link_id`, if there is one.
    pub async fn purge(&self, link_id: &str) -> Result<bool, AppError> {
        match self.repository.find_by_link_id(link_id).await? {
            Some(stats) => self.repository.delete(stats.id).await,
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickStatsRepository;
    use chrono::Utc;
    use serde_json::json;

    fn stats(id: i64, count: i64) -> ClickStats {
        ClickStats {
            id,
            link_id: "L".to_string(),
            count,
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_clicks_defaults_to_zero() {
        let mut repo = MockClickStatsRepository::new();
        repo.expect_find_by_link_id().returning(|_| Ok(None));

        let counter = ClickCounter::new(Arc::new(repo));
        assert_eq!(counter.clicks("L").await, 0);
    }

    #[tokio::test]
    async fn test_clicks_on_store_error_is_zero() {
        let mut repo = MockClickStatsRepository::new();
        repo.expect_find_by_link_id()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let counter = ClickCounter::new(Arc::new(repo));
        assert_eq!(counter.clicks("L").await, 0);
    }

    #[tokio::test]
    async fn test_purge_without_counter() {
        let mut repo = MockClickStatsRepository::new();
        repo.expect_find_by_link_id().returning(|_| Ok(None));
        repo.expect_delete().times(0);

        let counter = ClickCounter::new(Arc::new(repo));
        assert!(!counter.purge("L").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_deletes_counter() {
        let mut repo = MockClickStatsRepository::new();
        repo.expect_find_by_link_id()
            .returning(|_| Ok(Some(stats(4, 12))));
        repo.expect_delete()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|_| Ok(true));

        let counter = ClickCounter::new(Arc::new(repo));
        assert!(counter.purge("L").await.unwrap());
    }
}
