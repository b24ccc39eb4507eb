//! Serialized representations and listing parameters.
//!
//! Views are what the admin CLI prints as JSON and what an outer HTTP layer
//! would return. Keys are camelCase and every view carries the entity's
//! external key as `id`.

pub mod listing;
pub mod views;

pub use listing::{DEFAULT_PAGE_SIZE, ListParams, Scope};
pub use views::{ClickStatsView, EntityMeta, LinkView, VersionView};
