//! Error types for the catalog crate.

use tdm_commons::TableName;
use thiserror::Error;

/// Errors raised by catalog lookups and mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No catalog entry for table {0}")]
    EntryNotFound(TableName),

    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("Column '{column}' is reserved and cannot carry a descriptor")]
    ReservedColumn { column: String },

    #[error("Catalog storage error: {0}")]
    Storage(String),
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
