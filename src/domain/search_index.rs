//! Search index trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use super::search_document::{IndexName, TokenDocument};

/// Errors that can occur while talking to a search backend.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Search index connection error: {0}")]
    ConnectionError(String),
    #[error("Search index operation error: {0}")]
    OperationError(String),
}

/// Result type for search index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Token index accepting [`TokenDocument`]s under named indexes.
///
/// Putting a document with an existing `doc_id` replaces it.
///
/// # Implementations
///
/// - [`crate::infrastructure::search::RedisSearchIndex`] - Redis-backed inverted index
/// - [`crate::infrastructure::search::MemorySearchIndex`] - In-process index
/// - [`crate::infrastructure::search::NullSearchIndex`] - No-op for disabled search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Adds or replaces `document` in `index`.
    async fn put(&self, index: IndexName, document: TokenDocument) -> IndexResult<()>;

    /// Removes the document with `doc_id` from `index`. Missing documents are ignored.
    async fn remove(&self, index: IndexName, doc_id: &str) -> IndexResult<()>;

    /// Returns up to `limit` documents of `index` whose tokens include every
    /// entry of `tokens`, ordered by `doc_id`. The limit applies after the
    /// intersection.
    async fn search(
        &self,
        index: IndexName,
        tokens: &[String],
        limit: usize,
    ) -> IndexResult<Vec<TokenDocument>>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
