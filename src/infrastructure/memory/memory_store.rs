//! In-process entity store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{
    ClickStats, LinkVersion, NewLinkVersion, NewShortLink, ShortLink, SiteConfig,
};
use crate::domain::repositories::{
    ClickStatsRepository, LinkOrder, LinkQuery, LinkRepository, SiteConfigRepository,
    VersionRepository,
};
use crate::error::AppError;

const SITE_CONFIG_ID: i64 = 1;

/// Entity store kept in memory, implementing every repository trait.
///
/// Uses `DashMap` tables so concurrent readers and writers only contend on
/// the shard they touch. Name reservation and click increments go through
/// the map entry API and are therefore atomic. Ids come from a single
/// sequence shared by all tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sequence: AtomicI64,
    links: DashMap<i64, ShortLink>,
    names: DashMap<String, i64>,
    versions: DashMap<i64, LinkVersion>,
    stats: DashMap<i64, ClickStats>,
    stats_by_link: DashMap<String, i64>,
    site_config: DashMap<i64, SiteConfig>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of stored links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of stored versions across all links.
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Number of stored click counters.
    pub fn stats_count(&self) -> usize {
        self.stats.len()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.names.entry(new_link.name.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Link name already exists",
                json!({ "name": new_link.name }),
            )),
            Entry::Vacant(slot) => {
                let id = self.next_id();
                let now = Utc::now();
                let link = ShortLink::new(
                    id,
                    new_link.name,
                    new_link.destination,
                    new_link.link_id,
                    new_link.owner,
                    new_link.created_by,
                    new_link.modified_by,
                    now,
                    now,
                );
                slot.insert(id);
                self.links.insert(id, link.clone());
                Ok(link)
            }
        }
    }

    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError> {
        let mut stored = self
            .links
            .get_mut(&link.id)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link.id })))?;

        stored.destination = link.destination.clone();
        stored.owner = link.owner.clone();
        stored.modified_by = link.modified_by.clone();
        stored.modified = Utc::now();

        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get(&id).map(|l| l.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ShortLink>, AppError> {
        let Some(id) = self.names.get(name).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.links.get(&id).map(|l| l.clone()))
    }

    async fn list(&self, query: LinkQuery) -> Result<Vec<ShortLink>, AppError> {
        let mut links: Vec<ShortLink> = self
            .links
            .iter()
            .filter(|l| query.owner.as_ref().is_none_or(|o| &l.owner == o))
            .map(|l| l.clone())
            .collect();

        match query.order {
            LinkOrder::Name => links.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            LinkOrder::Destination => links.sort_by(|a, b| {
                a.destination
                    .cmp(&b.destination)
                    .then(a.id.cmp(&b.id))
            }),
        }

        Ok(links
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, owner: Option<String>) -> Result<i64, AppError> {
        let count = self
            .links
            .iter()
            .filter(|l| owner.as_ref().is_none_or(|o| &l.owner == o))
            .count();
        Ok(count as i64)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let Some((_, link)) = self.links.remove(&id) else {
            return Ok(false);
        };
        self.names.remove_if(&link.name, |_, owner_id| *owner_id == id);
        Ok(true)
    }
}

#[async_trait]
impl VersionRepository for MemoryStore {
    async fn append(&self, version: NewLinkVersion) -> Result<LinkVersion, AppError> {
        let id = self.next_id();
        let now = Utc::now();
        let stored = LinkVersion {
            id,
            link_id: version.link_id,
            destination: version.destination,
            owner: version.owner,
            created_by: version.created_by,
            modified_by: version.modified_by,
            created: now,
            modified: now,
        };
        self.versions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LinkVersion>, AppError> {
        Ok(self.versions.get(&id).map(|v| v.clone()))
    }

    async fn find_by_link_id(&self, link_id: &str) -> Result<Vec<LinkVersion>, AppError> {
        Ok(newest_first(
            self.versions
                .iter()
                .filter(|v| v.link_id == link_id)
                .map(|v| v.clone())
                .collect(),
        ))
    }

    async fn find_by_created_by(&self, created_by: &str) -> Result<Vec<LinkVersion>, AppError> {
        Ok(newest_first(
            self.versions
                .iter()
                .filter(|v| v.created_by == created_by)
                .map(|v| v.clone())
                .collect(),
        ))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.versions.remove(&id).is_some())
    }
}

fn newest_first(mut versions: Vec<LinkVersion>) -> Vec<LinkVersion> {
    versions.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
    versions
}

#[async_trait]
impl ClickStatsRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ClickStats>, AppError> {
        Ok(self.stats.get(&id).map(|s| s.clone()))
    }

    async fn find_by_link_id(&self, link_id: &str) -> Result<Option<ClickStats>, AppError> {
        let Some(id) = self.stats_by_link.get(link_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.stats.get(&id).map(|s| s.clone()))
    }

    async fn increment(&self, link_id: &str) -> Result<ClickStats, AppError> {
        // The entry guard serializes concurrent clicks on the same link.
        match self.stats_by_link.entry(link_id.to_string()) {
            Entry::Occupied(slot) => {
                let id = *slot.get();
                let mut stats = self.stats.get_mut(&id).ok_or_else(|| {
                    AppError::internal("Click counter index out of sync", json!({ "id": id }))
                })?;
                stats.count += 1;
                stats.modified = Utc::now();
                Ok(stats.clone())
            }
            Entry::Vacant(slot) => {
                let id = self.next_id();
                let now = Utc::now();
                let stats = ClickStats {
                    id,
                    link_id: link_id.to_string(),
                    count: 1,
                    created: now,
                    modified: now,
                };
                self.stats.insert(id, stats.clone());
                slot.insert(id);
                Ok(stats)
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let Some((_, stats)) = self.stats.remove(&id) else {
            return Ok(false);
        };
        self.stats_by_link
            .remove_if(&stats.link_id, |_, stats_id| *stats_id == id);
        Ok(true)
    }
}

#[async_trait]
impl SiteConfigRepository for MemoryStore {
    async fn get(&self) -> Result<Option<SiteConfig>, AppError> {
        Ok(self.site_config.get(&SITE_CONFIG_ID).map(|c| c.clone()))
    }

    async fn save(
        &self,
        domain: String,
        admin_users: Option<String>,
    ) -> Result<SiteConfig, AppError> {
        let now = Utc::now();
        let mut entry = self
            .site_config
            .entry(SITE_CONFIG_ID)
            .or_insert_with(|| SiteConfig {
                id: SITE_CONFIG_ID,
                domain: domain.clone(),
                admin_users: admin_users.clone(),
                created: now,
                modified: now,
            });

        entry.domain = domain;
        entry.admin_users = admin_users;
        entry.modified = now;

        Ok(entry.clone())
    }
}
