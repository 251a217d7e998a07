//! Bulk action request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tdm_commons::{ProjectId, SystemId};

/// The maintenance action applied to every resolved table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// Replace table content from its external refresh source.
    Refresh,
    /// Remove rows older than the cleanup config's retention window.
    Cleanup,
    /// Drop the physical table and its catalog metadata.
    Drop,
    /// Re-render link column metadata.
    RefreshLinks,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Refresh => "refresh",
            BulkAction::Cleanup => "cleanup",
            BulkAction::Drop => "drop",
            BulkAction::RefreshLinks => "refresh_links",
        }
    }
}

/// How the target table set is resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSelector {
    /// Every table of one system under a project.
    ProjectSystem {
        project: ProjectId,
        system: SystemId,
    },
    /// The table carrying a title within a project.
    ProjectTitle { project: ProjectId, title: String },
    /// Tables not used since `cutoff` (never-used tables included).
    LastUsedBefore { cutoff: DateTime<Utc> },
}

/// One bulk action request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionConfig {
    pub action: BulkAction,
    pub selector: TableSelector,
    /// Run tables concurrently instead of one after another.
    pub parallel: bool,
    /// Refresh/cleanup spare occupied rows instead of touching the whole
    /// table.
    pub save_occupied: bool,
    pub recipients: Vec<String>,
    /// Send the result summary to `recipients` when the run produced any
    /// results.
    pub send_result: bool,
}

impl BulkActionConfig {
    pub fn new(action: BulkAction, selector: TableSelector) -> Self {
        Self {
            action,
            selector,
            parallel: false,
            save_occupied: false,
            recipients: Vec::new(),
            send_result: false,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn save_occupied(mut self) -> Self {
        self.save_occupied = true;
        self
    }

    pub fn notify(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self.send_result = true;
        self
    }
}
