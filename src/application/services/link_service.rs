//! Shortlink lifecycle: creation, updates, ownership transfer, clicks and deletion.

use std::sync::Arc;

use crate::application::services::{ClickCounter, SearchIndexer, VersionHistory};
use crate::domain::entities::{LinkVersion, NewShortLink, ShortLink};
use crate::domain::external_key::{self, EntityKind};
use crate::domain::repositories::{ClickStatsRepository, LinkRepository, VersionRepository};
use crate::error::{AppError, ErrorResult};
use serde_json::json;

/// Service enforcing the rules for creating and mutating shortlinks.
///
/// Every successful write is followed by a submission to the search index.
/// Every change to an existing link first appends a snapshot of its previous
/// state to the version history.
pub struct LinkService<L: LinkRepository, V: VersionRepository, C: ClickStatsRepository> {
    link_repository: Arc<L>,
    history: VersionHistory<V>,
    clicks: ClickCounter<C>,
    indexer: Arc<SearchIndexer>,
}

impl<L, V, C> LinkService<L, V, C>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
{
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        version_repository: Arc<V>,
        click_repository: Arc<C>,
        indexer: Arc<SearchIndexer>,
    ) -> Self {
        Self {
            link_repository,
            history: VersionHistory::new(version_repository),
            clicks: ClickCounter::new(click_repository),
            indexer,
        }
    }

    /// Creates a shortlink named `name`.
    ///
    /// Returns `Ok(None)` without writing anything if a link with that name
    /// already exists. The existence check and the insert are separate store
    /// calls; stores that enforce unique names report a racing insert as a
    /// conflict, which is also returned as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `name` or `destination` is blank.
    pub async fn create_shortlink(
        &self,
        name: &str,
        created_by: &str,
        owner: &str,
        destination: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Link name must not be empty", json!({})));
        }
        if destination.trim().is_empty() {
            return Err(AppError::bad_request(
                "Destination must not be empty",
                json!({ "name": name }),
            ));
        }

        if self.link_repository.find_by_name(name).await?.is_some() {
            tracing::debug!(name, "Shortlink name already taken");
            return Ok(None);
        }

        let new_link = NewShortLink::new(name, created_by, owner, destination);
        let link = match self.link_repository.insert(new_link).await {
            Ok(link) => link,
            Err(e) if e.is_conflict() => {
                tracing::debug!(name, "Shortlink name taken by a concurrent insert");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        tracing::info!(name, link_id = %link.link_id, owner, "Shortlink created");
        self.indexer.index_link(&link).await;
        Ok(Some(link))
    }

    /// Points `link` at a new destination.
    ///
    /// A snapshot of the link's current state is appended to its history
    /// first. On success `link` is replaced with the stored entity and
    /// `Ok(None)` is returned.
    ///
    /// If the store is over quota the snapshot is retracted, `link` is left
    /// unchanged and the 503 [`ErrorResult`] is returned instead of an error.
    ///
    /// # Errors
    ///
    /// Any other store error, after retracting the snapshot.
    pub async fn update_link(
        &self,
        link: &mut ShortLink,
        destination: &str,
        modified_by: &str,
    ) -> Result<Option<ErrorResult>, AppError> {
        let mut changed = link.clone();
        changed.destination = destination.to_string();
        changed.modified_by = modified_by.to_string();

        self.apply_with_snapshot(link, changed).await
    }

    /// Hands `link` over to `new_owner`.
    ///
    /// Records a version snapshot even though the destination is unchanged,
    /// so the history keeps the previous owner. Quota handling is the same as
    /// for [`Self::update_link`].
    pub async fn transfer_ownership(
        &self,
        link: &mut ShortLink,
        new_owner: &str,
    ) -> Result<Option<ErrorResult>, AppError> {
        let mut changed = link.clone();
        changed.owner = new_owner.to_string();

        self.apply_with_snapshot(link, changed).await
    }

    async fn apply_with_snapshot(
        &self,
        link: &mut ShortLink,
        changed: ShortLink,
    ) -> Result<Option<ErrorResult>, AppError> {
        let snapshot = match self.history.record_snapshot(link).await {
            Ok(version) => version,
            Err(e) if e.is_resource_exhausted() => return Ok(Some(over_quota(link, &e))),
            Err(e) => return Err(e),
        };

        match self.link_repository.update(&changed).await {
            Ok(saved) => {
                tracing::info!(
                    name = %saved.name,
                    link_id = %saved.link_id,
                    version_id = snapshot.id,
                    "Shortlink updated"
                );
                self.indexer.index_link(&saved).await;
                *link = saved;
                Ok(None)
            }
            Err(e) => {
                self.retract(&snapshot).await;
                if e.is_resource_exhausted() {
                    Ok(Some(over_quota(link, &e)))
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn retract(&self, snapshot: &LinkVersion) {
        if self.history.retract(snapshot).await {
            tracing::debug!(version_id = snapshot.id, "Retracted snapshot of failed update");
        }
    }

    /// Counts a click on `link` and returns where to redirect.
    ///
    /// The destination is returned even if the click could not be counted.
    pub async fn click(&self, link: &ShortLink) -> String {
        if let Err(e) = self.clicks.record(&link.link_id).await {
            tracing::warn!(error = %e, link_id = %link.link_id, "Failed to record click");
        }
        link.destination.clone()
    }

    /// Deletes `link` together with its versions and click counter.
    ///
    /// Children are removed before the link itself, so an interrupted delete
    /// leaves a link with partial history rather than orphaned children.
    /// Returns `Ok(false)` if the link was already gone.
    pub async fn delete_link(&self, link: &ShortLink) -> Result<bool, AppError> {
        let versions = self.history.purge(&link.link_id).await?;
        let had_stats = self.clicks.purge(&link.link_id).await?;

        let deleted = self.link_repository.delete(link.id).await?;
        self.indexer.unindex_link(link).await;

        tracing::info!(
            name = %link.name,
            link_id = %link.link_id,
            versions,
            had_stats,
            deleted,
            "Shortlink deleted"
        );
        Ok(deleted)
    }

    /// Deletes the link referenced by an external key.
    ///
    /// Returns `Ok(false)` if the key is invalid or the link does not exist.
    pub async fn delete_by_external_key(&self, key: &str) -> Result<bool, AppError> {
        match self.get_by_external_key(key).await {
            Some(link) => self.delete_link(&link).await,
            None => Ok(false),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Option<ShortLink> {
        self.link_repository
            .find_by_name(name)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, name, "Failed to load shortlink");
                None
            })
    }

    pub async fn get_by_external_key(&self, key: &str) -> Option<ShortLink> {
        let id = external_key::decode_for(EntityKind::ShortLink, key)?;
        self.link_repository.find_by_id(id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, id, "Failed to load shortlink");
            None
        })
    }

    /// Previous states of `link`, newest first.
    pub async fn history(&self, link: &ShortLink) -> Vec<LinkVersion> {
        self.history.for_link(&link.link_id).await
    }

    pub async fn clicks(&self, link: &ShortLink) -> i64 {
        self.clicks.clicks(&link.link_id).await
    }
}

fn over_quota(link: &ShortLink, e: &AppError) -> ErrorResult {
    tracing::info!(error = %e, name = %link.name, "Over quota error.");
    metrics::counter!("shortlinks_quota_rejections_total").increment(1);
    ErrorResult::over_quota()
}
