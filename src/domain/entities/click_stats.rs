//! Per-link click counter.

use chrono::{DateTime, Utc};

/// Click counter for a link, created on the first click.
///
/// At most one record exists per `link_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickStats {
    pub id: i64,
    pub link_id: String,
    pub count: i64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
