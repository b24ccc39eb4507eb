//! Repository trait for shortlink data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Sort key for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkOrder {
    #[default]
    Name,
    Destination,
}

/// Filter, ordering and window for [`LinkRepository::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    pub owner: Option<String>,
    pub order: LinkOrder,
    pub offset: i64,
    pub limit: i64,
}

impl LinkQuery {
    /// Creates an unfiltered query over the given window, ordered by name.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            owner: None,
            order: LinkOrder::Name,
            offset,
            limit,
        }
    }

    /// Restricts the query to links owned by `owner`.
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn ordered_by(mut self, order: LinkOrder) -> Self {
        self.order = order;
        self
    }
}

/// Repository interface for shortlinks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores a new link and returns it with its assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the store enforces name uniqueness and
    /// the name is already taken.
    /// Returns [`AppError::ResourceExhausted`] when the store is over quota.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Persists the mutable fields of an existing link and refreshes `modified`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    /// Returns [`AppError::ResourceExhausted`] when the store is over quota.
    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ShortLink>, AppError>;

    /// Lists links matching `query`, sorted and windowed by offset.
    async fn list(&self, query: LinkQuery) -> Result<Vec<ShortLink>, AppError>;

    /// Counts links, optionally only those owned by `owner`.
    async fn count(&self, owner: Option<String>) -> Result<i64, AppError>;

    /// Removes a link. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
