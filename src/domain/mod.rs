//! Domain layer containing business entities and logic.
//!
//! Nothing in here depends on a concrete database or search backend.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`tokenizer`] - Turns names and URLs into search tokens
//! - [`search_document`] / [`search_index`] - Token documents and the index abstraction
//! - [`external_key`] - Opaque URL-safe entity references
//! - [`index_event`] / [`index_worker`] - Queued search index submissions
//!
//! # Indexing Flow
//!
//! 1. A link write succeeds in [`crate::application::services::LinkService`]
//! 2. [`crate::application::services::SearchIndexer`] builds one document per index
//! 3. In queued mode, [`index_event::IndexEvent`]s go to a bounded channel
//! 4. [`index_worker::run_index_worker`] submits them with retry logic

pub mod entities;
pub mod external_key;
pub mod index_event;
pub mod index_worker;
pub mod repositories;
pub mod search_document;
pub mod search_index;
pub mod tokenizer;
