//! Background worker applying queued index changes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use super::index_event::IndexEvent;
use super::search_index::{IndexResult, SearchIndex};

/// Drains `rx` and applies every event to `index`.
///
/// Each event is retried up to `max_retries` times with exponential backoff
/// (100ms, 200ms, 400ms, ...). Events that still fail are logged and counted
/// in `shortlinks_index_failures_total`, then dropped. Returns when every
/// sender has been dropped.
pub async fn run_index_worker(
    mut rx: mpsc::Receiver<IndexEvent>,
    index: Arc<dyn SearchIndex>,
    max_retries: usize,
) {
    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .map(jitter)
            .take(max_retries);

        let result = Retry::start(strategy, || apply(index.as_ref(), event.clone())).await;

        match result {
            Ok(()) => {
                tracing::debug!(index = %event.index(), doc_id = event.doc_id(), "Index event applied");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    index = %event.index(),
                    doc_id = event.doc_id(),
                    "Dropping index event after retries"
                );
                metrics::counter!("shortlinks_index_failures_total", "index" => event.index().as_str())
                    .increment(1);
            }
        }
    }

    tracing::info!("Index worker stopped");
}

async fn apply(index: &dyn SearchIndex, event: IndexEvent) -> IndexResult<()> {
    match event {
        IndexEvent::Put { index: name, document } => index.put(name, document).await,
        IndexEvent::Remove { index: name, doc_id } => index.remove(name, &doc_id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search_document::{IndexName, TokenDocument};
    use crate::domain::search_index::{IndexError, MockSearchIndex};

    fn document(id: &str) -> TokenDocument {
        TokenDocument {
            doc_id: id.to_string(),
            destination: "https://example.com".to_string(),
            name: "ex".to_string(),
            pieces: "e,e,x,ex,ex".to_string(),
            external_id: "key".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_applies_events_in_order() {
        let mut mock = MockSearchIndex::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_put()
            .withf(|index, doc| *index == IndexName::Name && doc.doc_id == "1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_remove()
            .withf(|index, doc_id| *index == IndexName::Destinations && doc_id == "1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (tx, rx) = mpsc::channel(8);
        tx.send(IndexEvent::Put {
            index: IndexName::Name,
            document: document("1"),
        })
        .await
        .unwrap();
        tx.send(IndexEvent::Remove {
            index: IndexName::Destinations,
            doc_id: "1".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        run_index_worker(rx, Arc::new(mock), 3).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_retries_then_drops() {
        let mut mock = MockSearchIndex::new();
        mock.expect_put()
            .times(3)
            .returning(|_, _| Err(IndexError::OperationError("down".to_string())));

        let (tx, rx) = mpsc::channel(8);
        tx.send(IndexEvent::Put {
            index: IndexName::Destinations,
            document: document("2"),
        })
        .await
        .unwrap();
        drop(tx);

        run_index_worker(rx, Arc::new(mock), 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_recovers_after_transient_failure() {
        let mut mock = MockSearchIndex::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(IndexError::ConnectionError("reset".to_string())));
        mock.expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (tx, rx) = mpsc::channel(8);
        tx.send(IndexEvent::Put {
            index: IndexName::Name,
            document: document("3"),
        })
        .await
        .unwrap();
        drop(tx);

        run_index_worker(rx, Arc::new(mock), 3).await;
    }
}
