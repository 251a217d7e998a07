//! Per-table results of a bulk run.

use serde::{Deserialize, Serialize};
use tdm_commons::TableName;

/// Counters of one cleanup pass over one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleanupStats {
    /// Row count before the pass.
    pub total: u64,
    pub removed: u64,
}

/// Counters of one refresh pass over one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefreshStats {
    /// Rows fetched from the external source.
    pub fetched: u64,
    pub inserted: u64,
    /// Occupied rows spared by `save_occupied`.
    pub preserved: u64,
}

/// Counters of one link-metadata pass over one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkStats {
    /// Link columns visited.
    pub columns: u64,
    /// Link targets rendered across all rows.
    pub links: u64,
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionOutcome {
    Refreshed(RefreshStats),
    Cleaned(CleanupStats),
    Dropped,
    LinksRefreshed(LinkStats),
    Failed { message: String },
}

impl ActionOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        ActionOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }
}

/// Result of one table within a bulk run, in catalog resolution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionResult {
    pub title: String,
    pub table_name: TableName,
    pub environment: String,
    pub outcome: ActionOutcome,
}

impl BulkActionResult {
    pub fn is_failed(&self) -> bool {
        self.outcome.is_failed()
    }
}
