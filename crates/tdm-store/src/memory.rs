//! In-memory SQL backend.
//!
//! Interprets the structured statement model from `tdm-sql` over a DashMap
//! of tables, with the same semantics a relational backend provides for the
//! narrow dialect the store emits. Used as the test backend and for
//! standalone (database-less) runs.
//!
//! Case-insensitive matching folds with Rust `to_lowercase`, i.e. Unicode
//! folding; SQL backends fold with `LOWER()` under the database collation.

use crate::backend::{Cursor, SqlBackend};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::time::Duration;
use tdm_commons::{Row, TableName, Value};
use tdm_sql::{ConditionKind, Predicate, SelectQuery, SortDirection, Statement};

#[derive(Debug, Default)]
struct TableData {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// In-memory implementation of [`SqlBackend`].
#[derive(Default)]
pub struct InMemoryBackend {
    tables: DashMap<String, TableData>,
    /// Artificial per-table latency, for timeout behavior in tests.
    latency: DashMap<String, Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject an artificial latency for every operation on `table`.
    ///
    /// When a call's timeout is shorter than the injected latency the call
    /// fails with [`StoreError::Timeout`] instead of sleeping.
    pub fn set_latency(&self, table: &TableName, latency: Duration) {
        self.latency.insert(table.as_str().to_string(), latency);
    }

    pub fn clear_latency(&self, table: &TableName) {
        self.latency.remove(table.as_str());
    }

    async fn simulate_latency(&self, table: &TableName, timeout: Option<Duration>) -> Result<()> {
        let latency = match self.latency.get(table.as_str()) {
            Some(entry) => *entry.value(),
            None => return Ok(()),
        };
        if let Some(timeout) = timeout {
            if latency > timeout {
                return Err(StoreError::Timeout {
                    table: table.clone(),
                    millis: timeout.as_millis() as u64,
                });
            }
        }
        tokio::time::sleep(latency).await;
        Ok(())
    }

    fn with_table<T>(
        &self,
        table: &TableName,
        f: impl FnOnce(&mut TableData) -> Result<T>,
    ) -> Result<T> {
        match self.tables.get_mut(table.as_str()) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(StoreError::TableNotFound(table.clone())),
        }
    }
}

#[async_trait]
impl SqlBackend for InMemoryBackend {
    async fn execute(&self, statement: &Statement, timeout: Option<Duration>) -> Result<u64> {
        self.simulate_latency(statement.table(), timeout).await?;
        match statement {
            Statement::CreateTable {
                table,
                if_not_exists,
                columns,
            } => {
                if self.tables.contains_key(table.as_str()) {
                    if *if_not_exists {
                        return Ok(0);
                    }
                    return Err(StoreError::Backend {
                        table: table.clone(),
                        message: "table already exists".to_string(),
                    });
                }
                self.tables.insert(
                    table.as_str().to_string(),
                    TableData {
                        columns: columns.iter().map(|c| c.name.clone()).collect(),
                        rows: Vec::new(),
                    },
                );
                Ok(0)
            }
            Statement::AddColumn { table, column } => self.with_table(table, |data| {
                // Idempotent: a repeated add must not fail the batch.
                if !data.columns.iter().any(|c| c == &column.name) {
                    data.columns.push(column.name.clone());
                }
                Ok(0)
            }),
            Statement::Insert {
                table,
                columns,
                rows,
            } => self.with_table(table, |data| {
                if let Some(unknown) = columns.iter().find(|c| !data.columns.contains(c)) {
                    return Err(StoreError::Backend {
                        table: table.clone(),
                        message: format!("column '{}' does not exist", unknown),
                    });
                }
                for values in rows {
                    let mut row = Row::new();
                    for (column, value) in columns.iter().zip(values.iter()) {
                        row.insert(column.clone(), value.clone());
                    }
                    data.rows.push(row);
                }
                Ok(rows.len() as u64)
            }),
            Statement::Update {
                table,
                assignments,
                predicate,
            } => self.with_table(table, |data| {
                let mut affected = 0;
                for row in data.rows.iter_mut() {
                    if matches_opt(predicate.as_ref(), row) {
                        for (column, value) in assignments {
                            row.insert(column.clone(), value.clone());
                        }
                        affected += 1;
                    }
                }
                Ok(affected)
            }),
            Statement::Delete { table, predicate } => self.with_table(table, |data| {
                let before = data.rows.len();
                data.rows.retain(|row| !matches_opt(predicate.as_ref(), row));
                Ok((before - data.rows.len()) as u64)
            }),
            Statement::DropTable { table } => {
                if self.tables.remove(table.as_str()).is_none() {
                    return Err(StoreError::TableNotFound(table.clone()));
                }
                Ok(0)
            }
            Statement::Truncate { table } => self.with_table(table, |data| {
                let removed = data.rows.len() as u64;
                data.rows.clear();
                Ok(removed)
            }),
        }
    }

    async fn select(&self, query: &SelectQuery, timeout: Option<Duration>) -> Result<Cursor> {
        self.simulate_latency(query.table(), timeout).await?;
        let rows = self.with_table(query.table(), |data| {
            let mut matched: Vec<Row> = data
                .rows
                .iter()
                .filter(|row| matches_opt(query.predicate(), row))
                .cloned()
                .collect();

            if let Some(order) = query.order() {
                matched.sort_by(|a, b| {
                    let cmp = compare_values(
                        a.get_or_null(&order.column),
                        b.get_or_null(&order.column),
                    );
                    match order.direction {
                        SortDirection::Asc => cmp,
                        SortDirection::Desc => cmp.reverse(),
                    }
                });
            }

            if let Some(page) = query.page() {
                let offset = page.offset.min(matched.len() as u64) as usize;
                matched = matched
                    .into_iter()
                    .skip(offset)
                    .take(page.limit as usize)
                    .collect();
            }

            // Project onto the requested column list; missing columns read as NULL.
            let projected: Vec<Row> = matched
                .into_iter()
                .map(|row| {
                    query
                        .columns()
                        .iter()
                        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                        .collect()
                })
                .collect();
            Ok(projected)
        })?;
        Ok(Cursor::from_rows(rows))
    }

    async fn count(&self, query: &SelectQuery, timeout: Option<Duration>) -> Result<u64> {
        self.simulate_latency(query.table(), timeout).await?;
        self.with_table(query.table(), |data| {
            Ok(data
                .rows
                .iter()
                .filter(|row| matches_opt(query.predicate(), row))
                .count() as u64)
        })
    }

    async fn columns(&self, table: &TableName) -> Result<Vec<String>> {
        match self.tables.get(table.as_str()) {
            Some(entry) => Ok(entry.value().columns.clone()),
            None => Err(StoreError::TableNotFound(table.clone())),
        }
    }

    async fn table_exists(&self, table: &TableName) -> Result<bool> {
        Ok(self.tables.contains_key(table.as_str()))
    }
}

fn matches_opt(predicate: Option<&Predicate>, row: &Row) -> bool {
    predicate.map_or(true, |p| matches(p, row))
}

/// Structural evaluation of the predicate tree over one row.
fn matches(predicate: &Predicate, row: &Row) -> bool {
    match predicate {
        Predicate::And(children) => children.iter().all(|c| matches(c, row)),
        Predicate::Or(children) => children.iter().any(|c| matches(c, row)),
        Predicate::IsNull { column } => row.get_or_null(column).is_null(),
        Predicate::IsNotNull { column } => !row.get_or_null(column).is_null(),
        Predicate::InIds { column, ids } => match row.get_or_null(column).render() {
            Some(value) => ids.contains(&value),
            None => false,
        },
        Predicate::Compare {
            column,
            kind,
            value,
            case_sensitive,
        } => {
            let cell = match row.get_or_null(column).render() {
                Some(cell) => cell,
                // Comparisons against NULL never match, as in SQL.
                None => return false,
            };
            match kind {
                ConditionKind::Equals => cell == *value,
                // Canonical timestamp text compares lexicographically in
                // chronological order, so string comparison is enough.
                ConditionKind::From => cell.as_str() >= value.as_str(),
                ConditionKind::To => cell.as_str() <= value.as_str(),
                ConditionKind::Contains => {
                    fold(&cell, *case_sensitive).contains(&fold(value, *case_sensitive))
                }
                ConditionKind::StartsWith => {
                    fold(&cell, *case_sensitive).starts_with(&fold(value, *case_sensitive))
                }
            }
        }
    }
}

fn fold(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        value.to_lowercase()
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.render(), b.render()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
