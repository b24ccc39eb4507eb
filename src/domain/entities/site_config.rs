//! Site-wide configuration record and the caller identity derived from it.

use chrono::{DateTime, Utc};

/// Singleton configuration stored alongside the links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub id: i64,
    /// Public domain short names are served from.
    pub domain: String,
    /// Comma-separated administrator emails.
    pub admin_users: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl SiteConfig {
    /// Returns true if `email` is listed in `admin_users`.
    ///
    /// Comparison ignores surrounding whitespace and ASCII case.
    pub fn is_admin(&self, email: &str) -> bool {
        let Some(admins) = self.admin_users.as_deref() else {
            return false;
        };

        admins
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .any(|a| a.eq_ignore_ascii_case(email.trim()))
    }
}

/// An authenticated caller.
///
/// Passed explicitly to the operations that depend on who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
    pub admin: bool,
}

impl CurrentUser {
    pub fn new(email: impl Into<String>, admin: bool) -> Self {
        Self {
            email: email.into(),
            admin,
        }
    }

    /// Resolves the admin flag from the stored site configuration.
    ///
    /// Without a configuration nobody is an administrator.
    pub fn from_site_config(email: impl Into<String>, config: Option<&SiteConfig>) -> Self {
        let email = email.into();
        let admin = config.is_some_and(|c| c.is_admin(&email));
        Self { email, admin }
    }
}
