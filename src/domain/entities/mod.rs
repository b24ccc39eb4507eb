//! Core domain entities.
//!
//! Entities are plain data structures without business logic. Each persisted
//! entity carries its store-assigned `id` and the `created` / `modified`
//! timestamps set by the store on write.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A unique name mapped to a destination URL
//! - [`LinkVersion`] - Snapshot of a link taken before it was changed
//! - [`ClickStats`] - Click counter for a link
//! - [`SiteConfig`] - Site-wide settings (serving domain, administrators)
//!
//! Structs prefixed with `New` describe records that have not been stored yet.

pub mod click_stats;
pub mod link;
pub mod site_config;
pub mod version;

pub use click_stats::ClickStats;
pub use link::{NewShortLink, ShortLink, generate_link_id};
pub use site_config::{CurrentUser, SiteConfig};
pub use version::{LinkVersion, NewLinkVersion};
