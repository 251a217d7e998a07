//! The catalog seam and its in-memory registry implementation.

use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tdm_commons::{ProjectId, SystemId, TableName};

/// Lookup and mutation seam for catalog entries.
///
/// Real deployments back this with the metadata database; the registry
/// implementation below serves tests and standalone mode. Resolution
/// methods return entries ordered by table name so bulk actions report
/// results deterministically.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Insert or replace the entry for its table.
    async fn upsert(&self, entry: CatalogEntry) -> Result<()>;

    async fn get(&self, table: &TableName) -> Result<CatalogEntry>;

    /// All entries of one system under a project.
    async fn by_project_and_system(
        &self,
        project: &ProjectId,
        system: &SystemId,
    ) -> Result<Vec<CatalogEntry>>;

    /// Entries matching a title within a project. Titles are unique per
    /// project, so this returns at most one entry.
    async fn by_project_and_title(
        &self,
        project: &ProjectId,
        title: &str,
    ) -> Result<Vec<CatalogEntry>>;

    /// Entries referencing the given cleanup config.
    async fn by_cleanup_config(&self, config_id: &str) -> Result<Vec<CatalogEntry>>;

    /// Entries whose `last_usage` is absent or at/before `cutoff`.
    async fn last_used_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<CatalogEntry>>;

    /// Record a usage of the table, moving `last_usage` forward.
    async fn touch(&self, table: &TableName, at: DateTime<Utc>) -> Result<()>;

    /// Remove the entry. Removing an absent entry is a no-op.
    async fn remove(&self, table: &TableName) -> Result<()>;
}

/// In-memory catalog keyed by table name.
#[derive(Default)]
pub struct CatalogRegistry {
    entries: DashMap<TableName, CatalogEntry>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_sorted<F>(&self, keep: F) -> Vec<CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        let mut matched: Vec<CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect();
        matched.sort_by(|a, b| a.table_name.cmp(&b.table_name));
        matched
    }
}

#[async_trait]
impl Catalog for CatalogRegistry {
    async fn upsert(&self, entry: CatalogEntry) -> Result<()> {
        self.entries.insert(entry.table_name.clone(), entry);
        Ok(())
    }

    async fn get(&self, table: &TableName) -> Result<CatalogEntry> {
        self.entries
            .get(table)
            .map(|e| e.value().clone())
            .ok_or_else(|| CatalogError::EntryNotFound(table.clone()))
    }

    async fn by_project_and_system(
        &self,
        project: &ProjectId,
        system: &SystemId,
    ) -> Result<Vec<CatalogEntry>> {
        Ok(self.collect_sorted(|e| &e.project_id == project && &e.system_id == system))
    }

    async fn by_project_and_title(
        &self,
        project: &ProjectId,
        title: &str,
    ) -> Result<Vec<CatalogEntry>> {
        Ok(self.collect_sorted(|e| &e.project_id == project && e.title == title))
    }

    async fn by_cleanup_config(&self, config_id: &str) -> Result<Vec<CatalogEntry>> {
        Ok(self.collect_sorted(|e| e.cleanup_config_id.as_deref() == Some(config_id)))
    }

    async fn last_used_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<CatalogEntry>> {
        Ok(self.collect_sorted(|e| match e.last_usage {
            None => true,
            Some(at) => at <= cutoff,
        }))
    }

    async fn touch(&self, table: &TableName, at: DateTime<Utc>) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(table)
            .ok_or_else(|| CatalogError::EntryNotFound(table.clone()))?;
        entry.last_usage = Some(at);
        Ok(())
    }

    async fn remove(&self, table: &TableName) -> Result<()> {
        if self.entries.remove(table).is_none() {
            log::debug!("catalog entry for {} already removed", table);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tdm_commons::EnvironmentId;

    fn entry(table: &str, project: &str, system: &str, title: &str) -> CatalogEntry {
        CatalogEntry::new(
            TableName::new(table),
            ProjectId::new(project),
            EnvironmentId::new("env-1"),
            SystemId::new(system),
            title,
        )
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_get_finds() {
        let catalog = CatalogRegistry::new();
        catalog
            .upsert(entry("tdm_orders", "p1", "billing", "Orders"))
            .await
            .unwrap();
        catalog
            .upsert(entry("tdm_orders", "p1", "billing", "Orders v2"))
            .await
            .unwrap();

        let found = catalog.get(&TableName::new("tdm_orders")).await.unwrap();
        assert_eq!(found.title, "Orders v2");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_typed() {
        let catalog = CatalogRegistry::new();
        let err = catalog.get(&TableName::new("tdm_ghost")).await.unwrap_err();
        assert_eq!(err, CatalogError::EntryNotFound(TableName::new("tdm_ghost")));
    }

    #[tokio::test]
    async fn test_resolution_is_scoped_and_ordered() {
        let catalog = CatalogRegistry::new();
        catalog
            .upsert(entry("tdm_b", "p1", "billing", "B"))
            .await
            .unwrap();
        catalog
            .upsert(entry("tdm_a", "p1", "billing", "A"))
            .await
            .unwrap();
        catalog
            .upsert(entry("tdm_c", "p1", "crm", "C"))
            .await
            .unwrap();
        catalog
            .upsert(entry("tdm_d", "p2", "billing", "D"))
            .await
            .unwrap();

        let matched = catalog
            .by_project_and_system(&ProjectId::new("p1"), &SystemId::new("billing"))
            .await
            .unwrap();
        let names: Vec<&str> = matched.iter().map(|e| e.table_name.as_str()).collect();
        assert_eq!(names, vec!["tdm_a", "tdm_b"]);

        let by_title = catalog
            .by_project_and_title(&ProjectId::new("p1"), "C")
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].table_name.as_str(), "tdm_c");
    }

    #[tokio::test]
    async fn test_touch_moves_table_out_of_stale_set() {
        let catalog = CatalogRegistry::new();
        catalog
            .upsert(entry("tdm_orders", "p1", "billing", "Orders"))
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::days(30);
        // Never-used tables count as stale.
        assert_eq!(catalog.last_used_before(cutoff).await.unwrap().len(), 1);

        catalog
            .touch(&TableName::new("tdm_orders"), Utc::now())
            .await
            .unwrap();
        assert!(catalog.last_used_before(cutoff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let catalog = CatalogRegistry::new();
        catalog
            .upsert(entry("tdm_orders", "p1", "billing", "Orders"))
            .await
            .unwrap();
        catalog.remove(&TableName::new("tdm_orders")).await.unwrap();
        catalog.remove(&TableName::new("tdm_orders")).await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_config_resolution() {
        let catalog = CatalogRegistry::new();
        catalog
            .upsert(entry("tdm_a", "p1", "billing", "A").with_cleanup_config("weekly"))
            .await
            .unwrap();
        catalog
            .upsert(entry("tdm_b", "p1", "billing", "B"))
            .await
            .unwrap();

        let matched = catalog.by_cleanup_config("weekly").await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].table_name.as_str(), "tdm_a");
    }
}
