//! LinkVersion entity: a snapshot of a link taken before it changed.

use chrono::{DateTime, Utc};

use super::ShortLink;

/// Immutable record of a shortlink's state before an update.
///
/// Versions are linked to their shortlink only through `link_id`; they never
/// reference each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkVersion {
    pub id: i64,
    pub link_id: String,
    pub destination: String,
    pub owner: String,
    pub created_by: String,
    pub modified_by: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Input data for appending a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinkVersion {
    pub link_id: String,
    pub destination: String,
    pub owner: String,
    pub created_by: String,
    pub modified_by: String,
}

impl NewLinkVersion {
    /// Captures the current state of `link`.
    pub fn snapshot_of(link: &ShortLink) -> Self {
        Self {
            link_id: link.link_id.clone(),
            destination: link.destination.clone(),
            owner: link.owner.clone(),
            created_by: link.created_by.clone(),
            modified_by: link.modified_by.clone(),
        }
    }
}
