//! Row extraction: cursor draining, canonical rendering and the total count.

use crate::backend::SqlBackend;
use crate::error::Result;
use std::time::Duration;
use tdm_commons::constants::{CREATED_WHEN, OCCUPIED_BY};
use tdm_commons::Row;
use tdm_sql::SelectQuery;

/// Result envelope of one table read.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReadResult {
    /// Columns in presentation order (`occupied_by` first, `created_when` last).
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// True total from the COUNT twin, not the number of rows returned.
    pub total: u64,
}

/// Presentation order for a column list: `occupied_by` first if present,
/// other columns in natural order, `created_when` last if present.
///
/// This is a display contract only; storage order is untouched.
pub fn display_order(columns: &[String]) -> Vec<String> {
    let mut ordered = Vec::with_capacity(columns.len());
    if columns.iter().any(|c| c == OCCUPIED_BY) {
        ordered.push(OCCUPIED_BY.to_string());
    }
    for column in columns {
        if column != OCCUPIED_BY && column != CREATED_WHEN {
            ordered.push(column.clone());
        }
    }
    if columns.iter().any(|c| c == CREATED_WHEN) {
        ordered.push(CREATED_WHEN.to_string());
    }
    ordered
}

/// Run `query`, drain its cursor and attach the COUNT twin's total.
///
/// Temporal values are canonicalized to text so consumers never see a
/// driver-native type. A COUNT failure (e.g. the table was concurrently
/// dropped) degrades the total to zero: extraction of already-fetched rows
/// must still succeed.
pub async fn extract(
    backend: &dyn SqlBackend,
    query: &SelectQuery,
    timeout: Option<Duration>,
) -> Result<TableReadResult> {
    let cursor = backend.select(query, timeout).await?;
    let rows: Vec<Row> = cursor
        .map(|row| {
            row.iter()
                .map(|(column, value)| (column.clone(), value.clone().canonicalize()))
                .collect()
        })
        .collect();

    let total = match backend.count(query, timeout).await {
        Ok(total) => total,
        Err(e) => {
            log::warn!(
                "count query failed for table {}, reporting total=0: {}",
                query.table(),
                e
            );
            0
        }
    };

    Ok(TableReadResult {
        columns: display_order(query.columns()),
        rows,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order_pins_system_columns() {
        let columns = vec![
            "created_when".to_string(),
            "name".to_string(),
            "occupied_by".to_string(),
            "city".to_string(),
        ];
        assert_eq!(
            display_order(&columns),
            vec!["occupied_by", "name", "city", "created_when"]
        );
    }

    #[test]
    fn test_display_order_without_system_columns() {
        let columns = vec!["b".to_string(), "a".to_string()];
        assert_eq!(display_order(&columns), vec!["b", "a"]);
    }
}
