//! Indexing request passed to the background index worker.

use super::search_document::{IndexName, TokenDocument};

/// A pending change to the search index.
///
/// Sent over a channel by [`crate::application::services::SearchIndexer`] in
/// queued mode and applied by [`crate::domain::index_worker::run_index_worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// Add or replace a document.
    Put {
        index: IndexName,
        document: TokenDocument,
    },
    /// Drop a document.
    Remove { index: IndexName, doc_id: String },
}

impl IndexEvent {
    pub fn index(&self) -> IndexName {
        match self {
            Self::Put { index, .. } | Self::Remove { index, .. } => *index,
        }
    }

    pub fn doc_id(&self) -> &str {
        match self {
            Self::Put { document, .. } => &document.doc_id,
            Self::Remove { doc_id, .. } => doc_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let put = IndexEvent::Put {
            index: IndexName::Name,
            document: TokenDocument {
                doc_id: "3".to_string(),
                destination: "d".to_string(),
                name: "n".to_string(),
                pieces: "n,n".to_string(),
                external_id: "x".to_string(),
            },
        };
        let remove = IndexEvent::Remove {
            index: IndexName::Destinations,
            doc_id: "4".to_string(),
        };

        assert_eq!(put.index(), IndexName::Name);
        assert_eq!(put.doc_id(), "3");
        assert_eq!(remove.index(), IndexName::Destinations);
        assert_eq!(remove.doc_id(), "4");
    }
}
