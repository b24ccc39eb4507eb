//! Application error type and store error mapping.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Message returned to callers when a write is refused because the store is
/// out of quota.
pub const OVER_QUOTA_MESSAGE: &str = "Link not indexed, over quota.";

/// Errors produced by the service layer and the repositories behind it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    /// The store rejected the operation for lack of quota or capacity.
    #[error("{message}")]
    ResourceExhausted { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn resource_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::ResourceExhausted {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::ResourceExhausted { .. } => "resource_exhausted",
            Self::Internal { .. } => "internal_error",
        }
    }
}

/// Structured result handed back instead of an error when a write is refused
/// by the store for lack of quota.
///
/// Serializes as `{"code": 503, "message": "...", "valid": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub code: u16,
    pub message: String,
    pub valid: bool,
}

impl ErrorResult {
    pub fn over_quota() -> Self {
        Self {
            code: 503,
            message: OVER_QUOTA_MESSAGE.to_string(),
            valid: true,
        }
    }
}

/// SQLSTATE class 53: insufficient resources (disk full, out of memory,
/// too many connections, ...).
const INSUFFICIENT_RESOURCES_CLASS: &str = "53";

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            return AppError::resource_exhausted(
                "Database connection pool exhausted",
                json!({ "reason": e.to_string() }),
            );
        }
        sqlx::Error::RowNotFound => {
            return AppError::not_found("Row not found", json!({}));
        }
        _ => {}
    }

    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        if db
            .code()
            .is_some_and(|code| code.starts_with(INSUFFICIENT_RESOURCES_CLASS))
        {
            return AppError::resource_exhausted(
                "Database out of resources",
                json!({ "code": db.code().map(|c| c.to_string()) }),
            );
        }
    }

    AppError::internal("Database error", json!({ "reason": e.to_string() }))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}
