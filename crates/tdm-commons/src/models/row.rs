//! Generic row representation for dynamic tables.

use crate::constants::is_system_column;
use crate::models::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered mapping from column name to value.
///
/// Rows have no identity beyond the injected `row_id` column; the map is
/// ordered by column name so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(values: Vec<(String, Value)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(column.into(), value)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Value of `column`, treating a missing column as NULL.
    pub fn get_or_null(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Column names excluding the injected system columns.
    pub fn user_column_names(&self) -> impl Iterator<Item = &str> {
        self.column_names().filter(|c| !is_system_column(c))
    }

    /// Copy of this row without the injected system columns.
    pub fn without_system_columns(&self) -> Row {
        Row {
            values: self
                .values
                .iter()
                .filter(|(k, _)| !is_system_column(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{OCCUPIED_BY, ROW_ID};

    #[test]
    fn test_row_accessors() {
        let mut row = Row::new();
        row.insert("name", Value::text("Alice"));
        row.insert(ROW_ID, Value::text("101"));

        assert_eq!(row.get("name"), Some(&Value::text("Alice")));
        assert_eq!(row.get_or_null("missing"), &Value::Null);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_user_columns_exclude_system() {
        let mut row = Row::new();
        row.insert("name", Value::text("Alice"));
        row.insert(ROW_ID, Value::text("101"));
        row.insert(OCCUPIED_BY, Value::Null);

        let user: Vec<&str> = row.user_column_names().collect();
        assert_eq!(user, vec!["name"]);
        assert_eq!(row.without_system_columns().len(), 1);
    }
}
