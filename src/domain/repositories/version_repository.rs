//! Repository trait for the link version history.

use crate::domain::entities::{LinkVersion, NewLinkVersion};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only store of [`LinkVersion`] snapshots.
///
/// Listings are returned newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Appends a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ResourceExhausted`] when the store is over quota.
    async fn append(&self, version: NewLinkVersion) -> Result<LinkVersion, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<LinkVersion>, AppError>;

    async fn find_by_link_id(&self, link_id: &str) -> Result<Vec<LinkVersion>, AppError>;

    async fn find_by_created_by(&self, created_by: &str) -> Result<Vec<LinkVersion>, AppError>;

    /// Removes a snapshot. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
