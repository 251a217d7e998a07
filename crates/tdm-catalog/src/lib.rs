//! # tdm-catalog
//!
//! Metadata around dynamic tables: which tables exist, who owns them, how
//! their columns render, and which maintenance configs apply.
//!
//! The [`Catalog`] trait is the lookup seam; [`CatalogRegistry`] is the
//! in-memory implementation used by tests and standalone mode. Column
//! descriptors and maintenance configs are presentation/maintenance
//! metadata only, they never influence generated DDL.

pub mod catalog;
pub mod columns;
pub mod configs;
pub mod entry;
pub mod environments;
pub mod error;

pub use catalog::{Catalog, CatalogRegistry};
pub use columns::{ColumnDescriptor, ColumnKey, ColumnKind, ColumnRegistry};
pub use configs::{CleanupConfig, ConfigStore, RefreshConfig};
pub use entry::CatalogEntry;
pub use environments::{
    CachedEnvironmentProvider, EnvironmentInfo, EnvironmentProvider, StaticEnvironmentProvider,
};
pub use error::{CatalogError, Result};
