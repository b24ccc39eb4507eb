//! Shared handles to the services, as built by [`crate::runtime`].

use std::sync::Arc;

use crate::application::services::{LinkService, QueryService, SearchIndexer};
use crate::domain::entities::CurrentUser;
use crate::domain::repositories::{
    ClickStatsRepository, LinkRepository, SiteConfigRepository, VersionRepository,
};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::persistence::{
    PgClickStatsRepository, PgLinkRepository, PgSiteConfigRepository, PgVersionRepository,
};

/// Services wired to one entity store and one search index.
pub struct AppState<L, V, C, S>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    pub links: Arc<LinkService<L, V, C>>,
    pub queries: Arc<QueryService<L, V, C>>,
    pub indexer: Arc<SearchIndexer>,
    pub site_config: Arc<S>,
    pub page_size: i64,
}

pub type PgAppState =
    AppState<PgLinkRepository, PgVersionRepository, PgClickStatsRepository, PgSiteConfigRepository>;

pub type MemoryAppState = AppState<MemoryStore, MemoryStore, MemoryStore, MemoryStore>;

impl<L, V, C, S> Clone for AppState<L, V, C, S>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    fn clone(&self) -> Self {
        Self {
            links: self.links.clone(),
            queries: self.queries.clone(),
            indexer: self.indexer.clone(),
            site_config: self.site_config.clone(),
            page_size: self.page_size,
        }
    }
}

impl<L, V, C, S> AppState<L, V, C, S>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    pub fn new(
        link_repository: Arc<L>,
        version_repository: Arc<V>,
        click_repository: Arc<C>,
        site_config: Arc<S>,
        indexer: Arc<SearchIndexer>,
        page_size: i64,
    ) -> Self {
        let links = LinkService::new(
            link_repository.clone(),
            version_repository.clone(),
            click_repository.clone(),
            indexer.clone(),
        );
        let queries = QueryService::new(link_repository, version_repository, click_repository);

        Self {
            links: Arc::new(links),
            queries: Arc::new(queries),
            indexer,
            site_config,
            page_size,
        }
    }

    /// Resolves `email` against the stored administrator list.
    ///
    /// A missing or unreadable site configuration grants no admin rights.
    pub async fn current_user(&self, email: &str) -> CurrentUser {
        let config = self.site_config.get().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load site configuration");
            None
        });
        CurrentUser::from_site_config(email, config.as_ref())
    }
}

impl MemoryAppState {
    /// Builds services over a single in-memory store.
    pub fn in_memory(store: Arc<MemoryStore>, indexer: Arc<SearchIndexer>, page_size: i64) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            indexer,
            page_size,
        )
    }
}
