//! Error types for SQL generation.

use thiserror::Error;

/// Errors raised while building queries and statements.
///
/// These are input-validation errors in the project taxonomy: they fail
/// fast at the boundary and are never logged-and-swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    #[error("Unsupported condition kind: {0}")]
    UnsupportedConditionKind(String),

    #[error("Unsafe identifier: {0}")]
    UnsafeIdentifier(String),

    #[error("Invalid filter on column '{column}': {reason}")]
    InvalidFilter { column: String, reason: String },
}
