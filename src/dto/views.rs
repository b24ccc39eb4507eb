//! External representations of stored entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{ClickStats, LinkVersion, ShortLink};
use crate::domain::external_key::{self, EntityKind};

/// Fields shared by every view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMeta {
    /// External key; `None` for entities that were never stored.
    pub id: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl EntityMeta {
    fn stored(
        kind: EntityKind,
        id: i64,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(external_key::encode(kind, id)),
            created: Some(created),
            modified: Some(modified),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    pub created_by: String,
    pub modified_by: String,
    pub link_id: String,
    pub destination: String,
    pub clicks: i64,
    pub owner: String,
    pub editable: bool,
}

impl LinkView {
    pub fn new(link: &ShortLink, clicks: i64, editable: bool) -> Self {
        Self {
            meta: EntityMeta::stored(EntityKind::ShortLink, link.id, link.created, link.modified),
            name: link.name.clone(),
            created_by: link.created_by.clone(),
            modified_by: link.modified_by.clone(),
            link_id: link.link_id.clone(),
            destination: link.destination.clone(),
            clicks,
            owner: link.owner.clone(),
            editable,
        }
    }
}

/// A past state of a link. `clicks` is the link's current total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionView {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub clicks: i64,
    pub destination: String,
    pub modified_by: String,
    pub created_by: String,
    pub link_id: String,
    pub owner: String,
}

impl VersionView {
    pub fn new(version: &LinkVersion, clicks: i64) -> Self {
        Self {
            meta: EntityMeta::stored(
                EntityKind::LinkVersion,
                version.id,
                version.created,
                version.modified,
            ),
            clicks,
            destination: version.destination.clone(),
            modified_by: version.modified_by.clone(),
            created_by: version.created_by.clone(),
            link_id: version.link_id.clone(),
            owner: version.owner.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickStatsView {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub count: i64,
    pub link_id: String,
}

impl From<&ClickStats> for ClickStatsView {
    fn from(stats: &ClickStats) -> Self {
        Self {
            meta: EntityMeta::stored(EntityKind::ClickStats, stats.id, stats.created, stats.modified),
            count: stats.count,
            link_id: stats.link_id.clone(),
        }
    }
}
