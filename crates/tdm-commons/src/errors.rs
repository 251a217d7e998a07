//! Shared error type for TDM crates.
//!
//! Leaf crates define richer `thiserror` enums; this type exists for the
//! places (ids, models) that must stay dependency-free.

use std::fmt;

/// Common error type for cross-crate plumbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Invalid input provided to a function
    InvalidInput(String),

    /// Resource not found
    NotFound(String),
}

impl CommonError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CommonError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for CommonError {}

/// Result type alias using CommonError.
pub type Result<T> = std::result::Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommonError::invalid_input("table name is empty");
        assert_eq!(err.to_string(), "Invalid input: table name is empty");

        let err = CommonError::not_found("tdm_orders_a1");
        assert_eq!(err.to_string(), "Not found: tdm_orders_a1");
    }
}
