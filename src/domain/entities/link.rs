//! ShortLink entity mapping a unique name to a destination URL.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored shortlink.
///
/// `id` is assigned by the store and stays stable for the lifetime of the
/// entity. `link_id` is generated once at creation and shared by every
/// [`LinkVersion`](super::LinkVersion) and [`ClickStats`](super::ClickStats)
/// that belongs to this link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub name: String,
    pub destination: String,
    pub link_id: String,
    pub owner: String,
    pub created_by: String,
    pub modified_by: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: String,
        destination: String,
        link_id: String,
        owner: String,
        created_by: String,
        modified_by: String,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            destination,
            link_id,
            owner,
            created_by,
            modified_by,
            created,
            modified,
        }
    }

    /// Returns true if `email` owns this link.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner == email
    }
}

/// Input data for creating a new shortlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub name: String,
    pub destination: String,
    pub link_id: String,
    pub owner: String,
    pub created_by: String,
    pub modified_by: String,
}

impl NewShortLink {
    /// Prepares a link for insertion with a freshly generated `link_id`.
    ///
    /// The creator is recorded as the last modifier.
    pub fn new(name: &str, created_by: &str, owner: &str, destination: &str) -> Self {
        Self {
            name: name.to_string(),
            destination: destination.to_string(),
            link_id: generate_link_id(),
            owner: owner.to_string(),
            created_by: created_by.to_string(),
            modified_by: created_by.to_string(),
        }
    }
}

/// Generates a random identifier for a link's whole version history.
pub fn generate_link_id() -> String {
    Uuid::new_v4().to_string()
}
