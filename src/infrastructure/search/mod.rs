//! Search index backends.
//!
//! Implementations of [`SearchIndex`](crate::domain::search_index::SearchIndex):
//! - [`RedisSearchIndex`] - Production Redis-backed inverted index
//! - [`MemorySearchIndex`] - In-process index for tests and local runs
//! - [`NullSearchIndex`] - No-op implementation when search is disabled

mod memory_index;
mod null_index;
mod redis_index;

pub use memory_index::MemorySearchIndex;
pub use null_index::NullSearchIndex;
pub use redis_index::RedisSearchIndex;
