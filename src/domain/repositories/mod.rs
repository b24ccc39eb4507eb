//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the keyed entity store. They are implemented by the
//! PostgreSQL repositories in `crate::infrastructure::persistence` and by the
//! in-process [`MemoryStore`](crate::infrastructure::memory::MemoryStore).
//! Mock implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Shortlink CRUD and sorted listings
//! - [`VersionRepository`] - Append-only link version history
//! - [`ClickStatsRepository`] - Per-link click counters
//! - [`SiteConfigRepository`] - Site configuration singleton
//!
//! The store does not enforce any relationship between links and their
//! versions or counters; cascading deletes are the service layer's job.

pub mod click_stats_repository;
pub mod link_repository;
pub mod site_config_repository;
pub mod version_repository;

pub use click_stats_repository::ClickStatsRepository;
pub use link_repository::{LinkOrder, LinkQuery, LinkRepository};
pub use site_config_repository::SiteConfigRepository;
pub use version_repository::VersionRepository;

#[cfg(test)]
pub use click_stats_repository::MockClickStatsRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use site_config_repository::MockSiteConfigRepository;
#[cfg(test)]
pub use version_repository::MockVersionRepository;
