//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx
//! runtime queries. The schema lives in `migrations/`.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Shortlink storage, lookups and sorted listings
//! - [`PgVersionRepository`] - Version history snapshots
//! - [`PgClickStatsRepository`] - Per-link click counters
//! - [`PgSiteConfigRepository`] - Site configuration singleton

pub mod pg_click_stats_repository;
pub mod pg_link_repository;
pub mod pg_site_config_repository;
pub mod pg_version_repository;

pub use pg_click_stats_repository::PgClickStatsRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_site_config_repository::PgSiteConfigRepository;
pub use pg_version_repository::PgVersionRepository;
