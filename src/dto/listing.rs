//! Listing parameters for paginated link queries.

use crate::domain::repositories::LinkOrder;

/// Links per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: i64 = 30;

/// Which links a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    All,
    /// Only links owned by the current user.
    #[default]
    Mine,
}

/// Sort order and scope of a listing.
///
/// Defaults to the current user's links ordered by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListParams {
    pub sort: LinkOrder,
    pub scope: Scope,
}

impl ListParams {
    pub fn new(sort: LinkOrder, scope: Scope) -> Self {
        Self { sort, scope }
    }

    /// Reads loosely formatted sort and scope strings.
    ///
    /// `sort` selects name order if it mentions `name` and destination order
    /// if it mentions `destination`; anything else yields the defaults and
    /// ignores `scope`. `scope` selects the owner's links if it mentions
    /// `mine`, all links otherwise.
    pub fn parse(sort: &str, scope: &str) -> Self {
        let sort = sort.to_ascii_lowercase();
        let order = if sort.contains("name") {
            LinkOrder::Name
        } else if sort.contains("destination") {
            LinkOrder::Destination
        } else {
            return Self::default();
        };

        let scope = if scope.to_ascii_lowercase().contains("mine") {
            Scope::Mine
        } else {
            Scope::All
        };

        Self::new(order, scope)
    }
}
