//! # tdm-jobs
//!
//! Bulk maintenance actions over cataloged dynamic tables: refresh from an
//! external source, retention cleanup, drop, and link-metadata refresh.
//!
//! ## Architecture
//!
//! The [`BulkActionOrchestrator`] resolves a table set from the catalog,
//! then runs one [`executors::BulkActionExecutor`] per table, sequentially
//! or as spawned workers. Data-mutating executors hold a per-table lock
//! from the [`lock::LockManager`] seam. A failing table never aborts the
//! run: it becomes a failed result in its slot and the rest proceed.
//! Progress streams through [`progress::ProgressSink`]; the final summary
//! goes to the [`notify::ResultNotifier`] when requested.

pub mod config;
pub mod context;
pub mod error;
pub mod executors;
pub mod external;
pub mod lock;
pub mod notify;
pub mod orchestrator;
pub mod progress;
pub mod results;

pub use config::{BulkAction, BulkActionConfig, TableSelector};
pub use context::TraceContext;
pub use error::{JobError, Result};
pub use external::ExternalQueryRunner;
pub use lock::{InProcessLockManager, LockGuard, LockManager};
pub use notify::{LoggingNotifier, NoopNotifier, ResultNotifier};
pub use orchestrator::BulkActionOrchestrator;
pub use progress::{
    ChannelProgressSink, LoggingProgressSink, NoopProgressSink, ProgressEvent, ProgressSink,
};
pub use results::{ActionOutcome, BulkActionResult, CleanupStats, LinkStats, RefreshStats};
