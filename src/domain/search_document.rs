//! Token documents submitted to the search index.

use std::fmt;

use super::entities::ShortLink;
use super::external_key::{self, EntityKind};
use super::tokenizer::pieces;

/// The two logical indexes a shortlink is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexName {
    /// Documents whose `pieces` are the tokenized destination.
    Destinations,
    /// Documents whose `pieces` are the tokenized name.
    Name,
}

impl IndexName {
    pub const ALL: [IndexName; 2] = [IndexName::Destinations, IndexName::Name];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destinations => "destinations",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record in one of the search indexes.
///
/// `doc_id` is the shortlink's store id; `external_id` is its external key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDocument {
    pub doc_id: String,
    pub destination: String,
    pub name: String,
    pub pieces: String,
    pub external_id: String,
}

impl TokenDocument {
    /// Builds the document for `link` in `index`.
    pub fn for_link(index: IndexName, link: &ShortLink) -> Self {
        let source = match index {
            IndexName::Destinations => &link.destination,
            IndexName::Name => &link.name,
        };

        Self {
            doc_id: link.id.to_string(),
            destination: link.destination.clone(),
            name: link.name.clone(),
            pieces: pieces(source),
            external_id: external_key::encode(EntityKind::ShortLink, link.id),
        }
    }
}

/// Sorts documents by their numeric `doc_id`, shortest id first.
pub fn sort_by_doc_id(documents: &mut [TokenDocument]) {
    documents.sort_by(|a, b| {
        a.doc_id
            .len()
            .cmp(&b.doc_id.len())
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
}
