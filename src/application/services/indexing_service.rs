//! Submission of shortlinks to the search index, and search over it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::entities::ShortLink;
use crate::domain::index_event::IndexEvent;
use crate::domain::search_document::{IndexName, TokenDocument};
use crate::domain::search_index::SearchIndex;
use crate::domain::tokenizer::strip_denylist;

/// Builds token documents for links and hands them to the search index.
///
/// Indexing never fails the caller: submission errors are logged and counted
/// in `shortlinks_index_failures_total`. In queued mode documents go through a
/// bounded channel drained by
/// [`run_index_worker`](crate::domain::index_worker::run_index_worker); when the
/// queue is full or closed they are submitted directly instead.
pub struct SearchIndexer {
    index: Arc<dyn SearchIndex>,
    queue: Option<mpsc::Sender<IndexEvent>>,
}

impl SearchIndexer {
    /// Creates an indexer that submits documents inline.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index, queue: None }
    }

    /// Creates an indexer that queues documents for the background worker.
    pub fn queued(index: Arc<dyn SearchIndex>, queue: mpsc::Sender<IndexEvent>) -> Self {
        Self {
            index,
            queue: Some(queue),
        }
    }

    /// Indexes `link` by destination and by name.
    pub async fn index_link(&self, link: &ShortLink) {
        for index in IndexName::ALL {
            self.submit(IndexEvent::Put {
                index,
                document: TokenDocument::for_link(index, link),
            })
            .await;
        }
    }

    /// Removes both documents of `link`.
    pub async fn unindex_link(&self, link: &ShortLink) {
        for index in IndexName::ALL {
            self.submit(IndexEvent::Remove {
                index,
                doc_id: link.id.to_string(),
            })
            .await;
        }
    }

    async fn submit(&self, event: IndexEvent) {
        let event = match &self.queue {
            Some(queue) => match queue.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(event)) => {
                    tracing::warn!(doc_id = event.doc_id(), "Index queue full, submitting inline");
                    event
                }
                Err(TrySendError::Closed(event)) => {
                    tracing::warn!(doc_id = event.doc_id(), "Index queue closed, submitting inline");
                    event
                }
            },
            None => event,
        };

        let index = event.index();
        let result = match event {
            IndexEvent::Put { index, document } => {
                let doc_id = document.doc_id.clone();
                self.index.put(index, document).await.map(|_| doc_id)
            }
            IndexEvent::Remove { index, doc_id } => {
                self.index.remove(index, &doc_id).await.map(|_| doc_id)
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, %index, "Search index submission failed");
            metrics::counter!("shortlinks_index_failures_total", "index" => index.as_str())
                .increment(1);
        }
    }

    /// Finds links whose name or destination contains every word of `query`.
    ///
    /// The query is cleaned with the same denylist as indexed text, so
    /// `docs.rs/tokio` looks up `docsrstokio`. Results from both indexes are
    /// merged by document id and returned in id order. Backend errors are
    /// logged and contribute no results.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<TokenDocument> {
        let cleaned = strip_denylist(query);
        let words: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut merged: BTreeMap<(usize, String), TokenDocument> = BTreeMap::new();

        for index in IndexName::ALL {
            match self.index.search(index, &words, limit).await {
                Ok(found) => {
                    for document in found {
                        merged
                            .entry((document.doc_id.len(), document.doc_id.clone()))
                            .or_insert(document);
                    }
                }
                Err(e) => tracing::warn!(error = %e, %index, "Search query failed"),
            }
        }

        merged.into_values().take(limit).collect()
    }

    pub async fn health_check(&self) -> bool {
        self.index.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search_index::{IndexError, MockSearchIndex};
    use crate::domain::tokenizer::pieces;
    use chrono::Utc;

    fn link(id: i64, name: &str, destination: &str) -> ShortLink {
        let now = Utc::now();
        ShortLink::new(
            id,
            name.to_string(),
            destination.to_string(),
            "lid".to_string(),
            "o".to_string(),
            "o".to_string(),
            "o".to_string(),
            now,
            now,
        )
    }

    fn document(id: &str, text: &str) -> TokenDocument {
        TokenDocument {
            doc_id: id.to_string(),
            destination: text.to_string(),
            name: text.to_string(),
            pieces: pieces(text),
            external_id: String::new(),
        }
    }

    #[tokio::test]
    async fn test_index_link_puts_both_documents() {
        let mut mock = MockSearchIndex::new();
        mock.expect_put()
            .withf(|index, doc| {
                *index == IndexName::Destinations && doc.doc_id == "7" && doc.pieces == pieces("http://ab")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_put()
            .withf(|index, doc| *index == IndexName::Name && doc.pieces == pieces("go"))
            .times(1)
            .returning(|_, _| Ok(()));

        let indexer = SearchIndexer::new(Arc::new(mock));
        indexer.index_link(&link(7, "go", "http://ab")).await;
    }

    #[tokio::test]
    async fn test_index_failure_is_swallowed() {
        let mut mock = MockSearchIndex::new();
        mock.expect_put()
            .times(2)
            .returning(|_, _| Err(IndexError::OperationError("quota".to_string())));

        let indexer = SearchIndexer::new(Arc::new(mock));
        indexer.index_link(&link(1, "a", "b")).await;
    }

    #[tokio::test]
    async fn test_queued_mode_sends_events() {
        let mock = MockSearchIndex::new();
        let (tx, mut rx) = mpsc::channel(4);

        let indexer = SearchIndexer::queued(Arc::new(mock), tx);
        indexer.unindex_link(&link(3, "a", "b")).await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.index(), IndexName::Destinations);
        assert_eq!(second.index(), IndexName::Name);
        assert_eq!(first.doc_id(), "3");
    }

    #[tokio::test]
    async fn test_full_queue_falls_back_to_inline() {
        let mut mock = MockSearchIndex::new();
        mock.expect_put()
            .withf(|index, _| *index == IndexName::Name)
            .times(1)
            .returning(|_, _| Ok(()));
        let (tx, _rx) = mpsc::channel(1);

        let indexer = SearchIndexer::queued(Arc::new(mock), tx);
        indexer.index_link(&link(3, "a", "b")).await;
    }

    #[tokio::test]
    async fn test_search_passes_every_word_and_merges_indexes() {
        let mut mock = MockSearchIndex::new();
        mock.expect_search()
            .withf(|index, tokens, limit| {
                *index == IndexName::Destinations && tokens == ["exam", "wik"] && *limit == 2
            })
            .returning(|_, _, _| Ok(vec![document("2", "example wiki"), document("10", "example wiki")]));
        mock.expect_search()
            .withf(|index, tokens, _| *index == IndexName::Name && tokens == ["exam", "wik"])
            .returning(|_, _, _| Ok(vec![document("2", "example wiki"), document("3", "wiki exam")]));

        let indexer = SearchIndexer::new(Arc::new(mock));
        let hits = indexer.search("exam wik", 2).await;

        let ids: Vec<_> = hits.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_search_cleans_query_and_orders_by_id() {
        let mut mock = MockSearchIndex::new();
        mock.expect_search()
            .withf(|_, tokens, _| tokens == ["docsrs"])
            .returning(|index, _, _| match index {
                IndexName::Destinations => Ok(vec![document("10", "docsrs"), document("9", "docsrs")]),
                IndexName::Name => Err(IndexError::ConnectionError("down".to_string())),
            });

        let indexer = SearchIndexer::new(Arc::new(mock));
        let hits = indexer.search("docs.rs", 10).await;

        let ids: Vec<_> = hits.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10"]);
        assert!(indexer.search(" ?! ", 10).await.is_empty());
    }
}
