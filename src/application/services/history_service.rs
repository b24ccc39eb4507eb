//! Link version history.

use std::sync::Arc;

use crate::domain::entities::{LinkVersion, NewLinkVersion, ShortLink};
use crate::domain::external_key::{self, EntityKind};
use crate::domain::repositories::VersionRepository;
use crate::error::AppError;

/// Append-only log of a link's previous states.
pub struct VersionHistory<V: VersionRepository> {
    repository: Arc<V>,
}

impl<V: VersionRepository> Clone for VersionHistory<V> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<V: VersionRepository> VersionHistory<V> {
    pub fn new(repository: Arc<V>) -> Self {
        Self { repository }
    }

    /// Appends a snapshot of `link` as it is right now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ResourceExhausted`] when the store is over quota.
    pub async fn record_snapshot(&self, link: &ShortLink) -> Result<LinkVersion, AppError> {
        self.repository
            .append(NewLinkVersion::snapshot_of(link))
            .await
    }

    /// Removes a snapshot whose update could not be persisted.
    ///
    /// Failures are logged; returns whether the snapshot is gone.
    pub async fn retract(&self, version: &LinkVersion) -> bool {
        match self.repository.delete(version.id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    version_id = version.id,
                    link_id = %version.link_id,
                    "Failed to retract version snapshot"
                );
                false
            }
        }
    }

    /// Versions of a link, newest first. Store errors yield an empty list.
    pub async fn for_link(&self, link_id: &str) -> Vec<LinkVersion> {
        self.repository
            .find_by_link_id(link_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, link_id, "Failed to load link versions");
                Vec::new()
            })
    }

    /// Versions whose link was created by `created_by`, newest first.
    pub async fn created_by(&self, created_by: &str) -> Vec<LinkVersion> {
        self.repository
            .find_by_created_by(created_by)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, created_by, "Failed to load versions by creator");
                Vec::new()
            })
    }

    pub async fn get_by_external_key(&self, key: &str) -> Option<LinkVersion> {
        let id = external_key::decode_for(EntityKind::LinkVersion, key)?;
        self.repository.find_by_id(id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, id, "Failed to load version");
            None
        })
    }

    /// Deletes every version of a link and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Stops at the first store error.
    pub async fn purge(&self, link_id: &str) -> Result<usize, AppError> {
        let versions = self.repository.find_by_link_id(link_id).await?;
        let mut removed = 0;
        for version in versions {
            if self.repository.delete(version.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockVersionRepository;
    use chrono::Utc;
    use serde_json::json;

    fn version(id: i64, link_id: &str) -> LinkVersion {
        LinkVersion {
            id,
            link_id: link_id.to_string(),
            destination: "http://old".to_string(),
            owner: "o".to_string(),
            created_by: "c".to_string(),
            modified_by: "m".to_string(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_purge_deletes_every_version() {
        let mut repo = MockVersionRepository::new();
        repo.expect_find_by_link_id()
            .withf(|link_id| link_id == "L")
            .times(1)
            .returning(|_| Ok(vec![version(1, "L"), version(2, "L")]));
        repo.expect_delete().times(2).returning(|_| Ok(true));

        let history = VersionHistory::new(Arc::new(repo));
        assert_eq!(history.purge("L").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_for_link_swallows_store_errors() {
        let mut repo = MockVersionRepository::new();
        repo.expect_find_by_link_id()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let history = VersionHistory::new(Arc::new(repo));
        assert!(history.for_link("L").await.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_external_key_checks_kind() {
        let mut repo = MockVersionRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == 5)
            .times(1)
            .returning(|id| Ok(Some(version(id, "L"))));

        let history = VersionHistory::new(Arc::new(repo));

        let key = external_key::encode(EntityKind::LinkVersion, 5);
        assert_eq!(history.get_by_external_key(&key).await.unwrap().id, 5);

        let wrong_kind = external_key::encode(EntityKind::ShortLink, 5);
        assert!(history.get_by_external_key(&wrong_kind).await.is_none());
        assert!(history.get_by_external_key("not-a-key").await.is_none());
    }

    #[tokio::test]
    async fn test_retract_reports_failure() {
        let mut repo = MockVersionRepository::new();
        repo.expect_delete()
            .returning(|_| Err(AppError::resource_exhausted("quota", json!({}))));

        let history = VersionHistory::new(Arc::new(repo));
        assert!(!history.retract(&version(3, "L")).await);
    }
}
