//! Read side: paginated listings, edit permissions and serialized views.

use std::sync::Arc;

use crate::application::services::{ClickCounter, VersionHistory};
use crate::domain::entities::{ClickStats, CurrentUser, LinkVersion, ShortLink};
use crate::domain::repositories::{
    ClickStatsRepository, LinkOrder, LinkQuery, LinkRepository, VersionRepository,
};
use crate::dto::{ClickStatsView, LinkView, ListParams, Scope, VersionView};

/// Listings over the whole store use this as their window size.
const UNBOUNDED: i64 = i64::MAX;

pub struct QueryService<L: LinkRepository, V: VersionRepository, C: ClickStatsRepository> {
    link_repository: Arc<L>,
    history: VersionHistory<V>,
    clicks: ClickCounter<C>,
}

impl<L, V, C> QueryService<L, V, C>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
{
    pub fn new(link_repository: Arc<L>, version_repository: Arc<V>, click_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            history: VersionHistory::new(version_repository),
            clicks: ClickCounter::new(click_repository),
        }
    }

    /// Returns page `page` (zero-based) of the links selected by `params`.
    ///
    /// Pages are offset windows over a freshly sorted result, so links added
    /// or removed between calls shift later pages. An owner-scoped listing
    /// without a user, a negative page or a non-positive page size yields an
    /// empty page, as do store errors.
    pub async fn fetch_sorted(
        &self,
        page: i64,
        params: ListParams,
        user: Option<&CurrentUser>,
        page_size: i64,
    ) -> Vec<ShortLink> {
        if page < 0 || page_size <= 0 {
            return Vec::new();
        }

        let owner = match (params.scope, user) {
            (Scope::All, _) => None,
            (Scope::Mine, Some(user)) => Some(user.email.clone()),
            (Scope::Mine, None) => return Vec::new(),
        };

        let offset = page.saturating_mul(page_size);
        let query = LinkQuery::new(offset, page_size)
            .with_owner(owner)
            .ordered_by(params.sort);

        self.list(query).await
    }

    /// Every link owned by `owner`, ordered by name.
    pub async fn fetch_by_owner(&self, owner: &str) -> Vec<ShortLink> {
        self.list(LinkQuery::new(0, UNBOUNDED).with_owner(Some(owner.to_string())))
            .await
    }

    pub async fn fetch_all(&self, order: LinkOrder) -> Vec<ShortLink> {
        self.list(LinkQuery::new(0, UNBOUNDED).ordered_by(order))
            .await
    }

    pub async fn count_all(&self) -> i64 {
        self.link_repository.count(None).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to count shortlinks");
            0
        })
    }

    async fn list(&self, query: LinkQuery) -> Vec<ShortLink> {
        self.link_repository
            .list(query)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to list shortlinks");
                Vec::new()
            })
    }

    /// Versions whose link was created by `created_by`, newest first.
    pub async fn versions_created_by(&self, created_by: &str) -> Vec<LinkVersion> {
        self.history.created_by(created_by).await
    }

    /// Whether `user` may modify `link`: its owner or an administrator.
    pub fn is_editable(link: &ShortLink, user: Option<&CurrentUser>) -> bool {
        user.is_some_and(|user| user.admin || link.is_owned_by(&user.email))
    }

    pub async fn link_view(&self, link: &ShortLink, user: Option<&CurrentUser>) -> LinkView {
        let clicks = self.clicks.clicks(&link.link_id).await;
        LinkView::new(link, clicks, Self::is_editable(link, user))
    }

    pub async fn version_view(&self, version: &LinkVersion) -> VersionView {
        let clicks = self.clicks.clicks(&version.link_id).await;
        VersionView::new(version, clicks)
    }

    pub fn click_stats_view(stats: &ClickStats) -> ClickStatsView {
        ClickStatsView::from(stats)
    }

    /// Counter view for `link`, `None` until it is first clicked.
    pub async fn click_stats_for(&self, link: &ShortLink) -> Option<ClickStatsView> {
        self.clicks
            .stats(&link.link_id)
            .await
            .as_ref()
            .map(Self::click_stats_view)
    }

    /// Counter view addressed by its external key.
    pub async fn click_stats_by_key(&self, key: &str) -> Option<ClickStatsView> {
        self.clicks
            .get_by_external_key(key)
            .await
            .as_ref()
            .map(Self::click_stats_view)
    }
}
