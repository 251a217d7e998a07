//! Error types for bulk actions.

use tdm_catalog::CatalogError;
use tdm_store::StoreError;
use thiserror::Error;

/// Errors raised while orchestrating or executing bulk actions.
///
/// Per-table failures are captured as failed results and never surface
/// through this type from the orchestrator; it is returned only when the
/// run as a whole cannot proceed (resolution failure) or from a single
/// executor step to its caller inside the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Could not acquire lock '{key}' within {millis} ms")]
    LockTimeout { key: String, millis: u64 },

    #[error("Table {table} has no {kind} config assigned")]
    ConfigNotAssigned { table: String, kind: &'static str },

    #[error("Missing {kind} config '{id}'")]
    MissingConfig { kind: &'static str, id: String },

    #[error("External query failed: {0}")]
    External(String),

    #[error("Worker task failed: {0}")]
    Join(String),
}

/// Result type alias for job operations.
pub type Result<T> = std::result::Result<T, JobError>;
