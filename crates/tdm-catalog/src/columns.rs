//! Column descriptors: presentation metadata layered over physical columns.
//!
//! Physical schemas only know TEXT columns; descriptors say how a column is
//! rendered (plain text, date, or a templated link) without touching DDL.
//! Descriptor metadata may lead or lag the physical schema, both directions
//! are tolerated by readers.

use crate::error::{CatalogError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tdm_commons::constants::is_system_column;
use tdm_commons::TableName;

/// Placeholder replaced by the cell value when a link template renders.
pub const LINK_VALUE_PLACEHOLDER: &str = "{value}";

/// Separator between values of a multi-value cell.
pub const MULTI_VALUE_SEPARATOR: char = ',';

/// Rendering category of a user column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Date,
    Link,
}

/// Identity of one described column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub table: TableName,
    pub column: String,
}

impl ColumnKey {
    pub fn new(table: TableName, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }
}

/// Presentation metadata of one user column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: ColumnKey,
    pub kind: ColumnKind,
    /// URL template with [`LINK_VALUE_PLACEHOLDER`], for [`ColumnKind::Link`].
    pub link_template: Option<String>,
    /// Cell holds several separator-joined values, each linked separately.
    pub multi_value: bool,
}

impl ColumnDescriptor {
    pub fn text(key: ColumnKey) -> Self {
        Self {
            key,
            kind: ColumnKind::Text,
            link_template: None,
            multi_value: false,
        }
    }

    pub fn date(key: ColumnKey) -> Self {
        Self {
            key,
            kind: ColumnKind::Date,
            link_template: None,
            multi_value: false,
        }
    }

    pub fn link(key: ColumnKey, template: impl Into<String>, multi_value: bool) -> Self {
        Self {
            key,
            kind: ColumnKind::Link,
            link_template: Some(template.into()),
            multi_value,
        }
    }

    /// Render the cell's link targets.
    ///
    /// Non-link descriptors and empty cells yield nothing. Multi-value cells
    /// are split on [`MULTI_VALUE_SEPARATOR`] with each part trimmed and
    /// substituted on its own.
    pub fn render_links(&self, raw: &str) -> Vec<String> {
        let template = match (&self.kind, &self.link_template) {
            (ColumnKind::Link, Some(template)) => template,
            _ => return Vec::new(),
        };
        let parts: Vec<&str> = if self.multi_value {
            raw.split(MULTI_VALUE_SEPARATOR).map(str::trim).collect()
        } else {
            vec![raw.trim()]
        };
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| template.replace(LINK_VALUE_PLACEHOLDER, p))
            .collect()
    }
}

/// In-memory descriptor registry keyed by table and column.
#[derive(Default)]
pub struct ColumnRegistry {
    descriptors: DashMap<ColumnKey, ColumnDescriptor>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a descriptor. System columns are rendered by fixed
    /// rules and never carry descriptors.
    pub fn upsert(&self, descriptor: ColumnDescriptor) -> Result<()> {
        if is_system_column(&descriptor.key.column) {
            return Err(CatalogError::ReservedColumn {
                column: descriptor.key.column.clone(),
            });
        }
        self.descriptors.insert(descriptor.key.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, key: &ColumnKey) -> Option<ColumnDescriptor> {
        self.descriptors.get(key).map(|d| d.value().clone())
    }

    /// All descriptors of one table, ordered by column name.
    pub fn for_table(&self, table: &TableName) -> Vec<ColumnDescriptor> {
        let mut matched: Vec<ColumnDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| &d.key().table == table)
            .map(|d| d.value().clone())
            .collect();
        matched.sort_by(|a, b| a.key.column.cmp(&b.key.column));
        matched
    }

    /// Drop every descriptor of a table, as part of table teardown.
    pub fn remove_table(&self, table: &TableName) {
        self.descriptors.retain(|key, _| &key.table != table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdm_commons::constants::ROW_ID;

    fn key(column: &str) -> ColumnKey {
        ColumnKey::new(TableName::new("tdm_orders"), column)
    }

    #[test]
    fn test_system_columns_are_rejected() {
        let registry = ColumnRegistry::new();
        let err = registry.upsert(ColumnDescriptor::text(key(ROW_ID))).unwrap_err();
        assert_eq!(
            err,
            CatalogError::ReservedColumn {
                column: ROW_ID.to_string()
            }
        );
    }

    #[test]
    fn test_link_rendering_single_value() {
        let descriptor =
            ColumnDescriptor::link(key("ticket"), "https://issues.example/{value}", false);
        assert_eq!(
            descriptor.render_links("TDM-42"),
            vec!["https://issues.example/TDM-42"]
        );
        assert!(descriptor.render_links("  ").is_empty());
    }

    #[test]
    fn test_link_rendering_multi_value_splits_and_trims() {
        let descriptor =
            ColumnDescriptor::link(key("tickets"), "https://issues.example/{value}", true);
        assert_eq!(
            descriptor.render_links("TDM-1, TDM-2,,TDM-3"),
            vec![
                "https://issues.example/TDM-1",
                "https://issues.example/TDM-2",
                "https://issues.example/TDM-3"
            ]
        );
    }

    #[test]
    fn test_non_link_descriptor_renders_nothing() {
        let descriptor = ColumnDescriptor::date(key("valid_until"));
        assert!(descriptor.render_links("2026-01-01").is_empty());
    }

    #[test]
    fn test_for_table_is_scoped_and_ordered() {
        let registry = ColumnRegistry::new();
        registry.upsert(ColumnDescriptor::text(key("name"))).unwrap();
        registry.upsert(ColumnDescriptor::text(key("city"))).unwrap();
        registry
            .upsert(ColumnDescriptor::text(ColumnKey::new(
                TableName::new("tdm_other"),
                "name",
            )))
            .unwrap();

        let descriptors = registry.for_table(&TableName::new("tdm_orders"));
        let columns: Vec<&str> = descriptors.iter().map(|d| d.key.column.as_str()).collect();
        assert_eq!(columns, vec!["city", "name"]);

        registry.remove_table(&TableName::new("tdm_orders"));
        assert!(registry.for_table(&TableName::new("tdm_orders")).is_empty());
        assert_eq!(registry.for_table(&TableName::new("tdm_other")).len(), 1);
    }
}
