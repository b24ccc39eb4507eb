//! Application layer services implementing business logic.
//!
//! Services consume the repository traits and the search index abstraction
//! and expose the operations callers use. None of them talk to a database or
//! to Redis directly.
//!
//! # Available Services
//!
//! - [`services::LinkService`] - Shortlink creation, updates, transfers, clicks and deletes
//! - [`services::QueryService`] - Paginated listings and serialized views
//! - [`services::VersionHistory`] - Append-only snapshots of previous link states
//! - [`services::ClickCounter`] - Per-link click totals
//! - [`services::SearchIndexer`] - Token documents and search over them

pub mod services;
