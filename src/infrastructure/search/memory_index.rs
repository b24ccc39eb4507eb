//! In-process search index.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;

use crate::domain::search_document::{IndexName, TokenDocument, sort_by_doc_id};
use crate::domain::search_index::{IndexResult, SearchIndex};
use crate::domain::tokenizer::split_pieces;

/// Search index holding documents in memory.
///
/// Lookups scan the stored `pieces` of every document in the requested index.
#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    documents: DashMap<(IndexName, String), TokenDocument>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored document, if any.
    pub fn get(&self, index: IndexName, doc_id: &str) -> Option<TokenDocument> {
        self.documents
            .get(&(index, doc_id.to_string()))
            .map(|d| d.clone())
    }

    /// Number of documents in `index`.
    pub fn len(&self, index: IndexName) -> usize {
        self.documents.iter().filter(|e| e.key().0 == index).count()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn put(&self, index: IndexName, document: TokenDocument) -> IndexResult<()> {
        self.documents
            .insert((index, document.doc_id.clone()), document);
        Ok(())
    }

    async fn remove(&self, index: IndexName, doc_id: &str) -> IndexResult<()> {
        self.documents.remove(&(index, doc_id.to_string()));
        Ok(())
    }

    async fn search(
        &self,
        index: IndexName,
        tokens: &[String],
        limit: usize,
    ) -> IndexResult<Vec<TokenDocument>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: Vec<TokenDocument> = self
            .documents
            .iter()
            .filter(|e| e.key().0 == index)
            .filter(|e| {
                let carried: HashSet<&str> = split_pieces(&e.value().pieces).collect();
                tokens.iter().all(|t| carried.contains(t.as_str()))
            })
            .map(|e| e.value().clone())
            .collect();

        sort_by_doc_id(&mut found);
        found.truncate(limit);
        Ok(found)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tokenizer::pieces;

    fn words(query: &str) -> Vec<String> {
        query.split_whitespace().map(str::to_string).collect()
    }

    fn document(id: &str, text: &str) -> TokenDocument {
        TokenDocument {
            doc_id: id.to_string(),
            destination: text.to_string(),
            name: text.to_string(),
            pieces: pieces(text),
            external_id: format!("key-{id}"),
        }
    }

    #[tokio::test]
    async fn put_replaces_and_search_matches_tokens() {
        let index = MemorySearchIndex::new();
        index
            .put(IndexName::Name, document("1", "rustlang"))
            .await
            .unwrap();
        index
            .put(IndexName::Name, document("2", "golang"))
            .await
            .unwrap();

        let hits = index.search(IndexName::Name, &words("lang"), 10).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = index.search(IndexName::Name, &words("rust"), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "1");

        index
            .put(IndexName::Name, document("1", "python"))
            .await
            .unwrap();
        assert!(index.search(IndexName::Name, &words("rust"), 10).await.unwrap().is_empty());
        assert_eq!(index.len(IndexName::Name), 2);
    }

    #[tokio::test]
    async fn indexes_are_separate() {
        let index = MemorySearchIndex::new();
        index
            .put(IndexName::Destinations, document("1", "example"))
            .await
            .unwrap();

        assert!(index.search(IndexName::Name, &words("exa"), 10).await.unwrap().is_empty());
        assert_eq!(
            index
                .search(IndexName::Destinations, &words("xam"), 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn remove_and_limit() {
        let index = MemorySearchIndex::new();
        for id in ["1", "2", "3"] {
            index
                .put(IndexName::Name, document(id, "same"))
                .await
                .unwrap();
        }

        let hits = index.search(IndexName::Name, &words("same"), 2).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        index.remove(IndexName::Name, "1").await.unwrap();
        index.remove(IndexName::Name, "missing").await.unwrap();
        assert!(index.get(IndexName::Name, "1").is_none());
        assert_eq!(index.len(IndexName::Name), 2);
    }

    #[tokio::test]
    async fn search_requires_every_token() {
        let index = MemorySearchIndex::new();
        index
            .put(IndexName::Name, document("1", "rust book"))
            .await
            .unwrap();
        index
            .put(IndexName::Name, document("2", "rust"))
            .await
            .unwrap();

        let hits = index.search(IndexName::Name, &words("rust boo"), 10).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert!(index.search(IndexName::Name, &[], 10).await.unwrap().is_empty());
    }
}
