//! Maintenance configs shared by many tables.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Age-based row cleanup applied to every table referencing the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupConfig {
    pub id: String,
    pub enabled: bool,
    /// Timestamp column the retention window is measured against.
    pub column: String,
    pub retention_days: u32,
}

/// External refresh source for a table's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub id: String,
    /// Query executed against the source system; opaque to this crate.
    pub query: String,
    pub timeout_secs: u64,
}

/// In-memory store for both config kinds.
#[derive(Default)]
pub struct ConfigStore {
    cleanup: DashMap<String, CleanupConfig>,
    refresh: DashMap<String, RefreshConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_cleanup(&self, config: CleanupConfig) {
        self.cleanup.insert(config.id.clone(), config);
    }

    pub fn cleanup(&self, id: &str) -> Option<CleanupConfig> {
        self.cleanup.get(id).map(|c| c.value().clone())
    }

    pub fn remove_cleanup(&self, id: &str) {
        self.cleanup.remove(id);
    }

    pub fn upsert_refresh(&self, config: RefreshConfig) {
        self.refresh.insert(config.id.clone(), config);
    }

    pub fn refresh(&self, id: &str) -> Option<RefreshConfig> {
        self.refresh.get(id).map(|c| c.value().clone())
    }

    pub fn remove_refresh(&self, id: &str) {
        self.refresh.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_store_roundtrip() {
        let store = ConfigStore::new();
        store.upsert_cleanup(CleanupConfig {
            id: "weekly".to_string(),
            enabled: true,
            column: "created_when".to_string(),
            retention_days: 7,
        });
        store.upsert_refresh(RefreshConfig {
            id: "nightly".to_string(),
            query: "SELECT * FROM source_orders".to_string(),
            timeout_secs: 300,
        });

        assert_eq!(store.cleanup("weekly").unwrap().retention_days, 7);
        assert_eq!(store.refresh("nightly").unwrap().timeout_secs, 300);
        assert!(store.cleanup("missing").is_none());

        store.remove_cleanup("weekly");
        assert!(store.cleanup("weekly").is_none());
    }
}
