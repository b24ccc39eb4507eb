//! Business logic services for the application layer.

pub mod click_service;
pub mod history_service;
pub mod indexing_service;
pub mod link_service;
pub mod query_service;

pub use click_service::ClickCounter;
pub use history_service::VersionHistory;
pub use indexing_service::SearchIndexer;
pub use link_service::LinkService;
pub use query_service::QueryService;
