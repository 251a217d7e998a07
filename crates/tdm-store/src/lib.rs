//! # tdm-store
//!
//! Physical-table lifecycle for runtime-created data tables.
//!
//! This crate contains:
//! - **SqlBackend**: the pluggable execution seam. Real deployments bind it
//!   to a relational database driver; [`memory::InMemoryBackend`] interprets
//!   the same statement model in process and is the test/standalone backend.
//! - **Row extractor**: drains a one-shot cursor into rows with canonical
//!   temporal rendering and attaches the COUNT twin's total.
//! - **DynamicTableStore**: create-if-absent, add-column-on-demand,
//!   insert/update/delete/occupy/release, drop/truncate.
//!
//! ## Failure semantics
//!
//! All DDL/DML failures surface a typed [`StoreError`] carrying the table
//! name; nothing is swallowed here. Best-effort tolerance (drop-if-exists)
//! is an explicit wrapper with a documented tolerated error, not a broad
//! catch.

pub mod backend;
pub mod dynamic_store;
pub mod error;
pub mod extractor;
pub mod memory;

pub use backend::{Cursor, SqlBackend};
pub use dynamic_store::DynamicTableStore;
pub use error::{Result, StoreError};
pub use extractor::{display_order, extract, TableReadResult};
pub use memory::InMemoryBackend;
