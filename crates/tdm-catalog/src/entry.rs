//! Catalog entry: the metadata record behind one dynamic table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tdm_commons::{EnvironmentId, ProjectId, SystemId, TableName};

/// One cataloged dynamic table.
///
/// The entry ties a physical table to its owning project/environment/system
/// triple and to the optional maintenance configs. `last_usage` is touched on
/// every occupation so stale tables can be found and swept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub table_name: TableName,
    pub project_id: ProjectId,
    pub environment_id: EnvironmentId,
    pub system_id: SystemId,
    /// Human-facing dataset title, unique per project.
    pub title: String,
    pub cleanup_config_id: Option<String>,
    pub refresh_config_id: Option<String>,
    pub last_usage: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    pub fn new(
        table_name: TableName,
        project_id: ProjectId,
        environment_id: EnvironmentId,
        system_id: SystemId,
        title: impl Into<String>,
    ) -> Self {
        Self {
            table_name,
            project_id,
            environment_id,
            system_id,
            title: title.into(),
            cleanup_config_id: None,
            refresh_config_id: None,
            last_usage: None,
        }
    }

    pub fn with_cleanup_config(mut self, id: impl Into<String>) -> Self {
        self.cleanup_config_id = Some(id.into());
        self
    }

    pub fn with_refresh_config(mut self, id: impl Into<String>) -> Self {
        self.refresh_config_id = Some(id.into());
        self
    }
}
