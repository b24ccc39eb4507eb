//! No-op search index for disabled search.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::search_document::{IndexName, TokenDocument};
use crate::domain::search_index::{IndexResult, SearchIndex};

/// A search index that stores nothing and finds nothing.
///
/// Used when Redis is not configured or unreachable at startup, so link
/// writes keep working without search.
pub struct NullSearchIndex;

impl NullSearchIndex {
    /// Creates a new NullSearchIndex instance.
    pub fn new() -> Self {
        debug!("Using NullSearchIndex (search disabled)");
        Self
    }
}

impl Default for NullSearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for NullSearchIndex {
    async fn put(&self, _index: IndexName, _document: TokenDocument) -> IndexResult<()> {
        Ok(())
    }

    async fn remove(&self, _index: IndexName, _doc_id: &str) -> IndexResult<()> {
        Ok(())
    }

    async fn search(
        &self,
        _index: IndexName,
        _tokens: &[String],
        _limit: usize,
    ) -> IndexResult<Vec<TokenDocument>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
