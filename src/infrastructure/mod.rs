//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-process entity store
//! - [`search`] - Search index backends (Redis, in-memory and no-op)

pub mod memory;
pub mod persistence;
pub mod search;
