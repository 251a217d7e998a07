//! DDL/DML statement model for dynamic tables.
//!
//! Statements are structured values with a `to_sql()` rendering so that SQL
//! backends send text while the in-memory backend interprets the same value
//! without re-parsing. All literal escaping goes through
//! [`crate::identifiers`].

use crate::filters::Predicate;
use crate::identifiers::{quote_ident, quote_literal};
use serde::{Deserialize, Serialize};
use tdm_commons::constants::{
    CREATED_WHEN, OCCUPIED_BY, OCCUPIED_DATE, ROW_ID, SELECTED, TIMESTAMP_FORMAT,
};
use tdm_commons::{TableName, Value};

/// SQL type of a created column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Timestamp,
    Boolean,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

/// One column in a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub default: Option<String>,
}

impl ColumnDef {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
            primary_key: false,
            default: None,
        }
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.column_type.as_sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

/// The base column set injected into every dynamic table.
pub fn system_column_defs() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: ROW_ID.to_string(),
            column_type: ColumnType::Text,
            primary_key: true,
            default: None,
        },
        ColumnDef::text(OCCUPIED_BY),
        ColumnDef {
            name: OCCUPIED_DATE.to_string(),
            column_type: ColumnType::Timestamp,
            primary_key: false,
            default: None,
        },
        ColumnDef {
            name: CREATED_WHEN.to_string(),
            column_type: ColumnType::Timestamp,
            primary_key: false,
            default: Some("CURRENT_TIMESTAMP".to_string()),
        },
        ColumnDef {
            name: SELECTED.to_string(),
            column_type: ColumnType::Boolean,
            primary_key: false,
            default: Some("FALSE".to_string()),
        },
    ]
}

/// A mutating statement against one dynamic table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    CreateTable {
        table: TableName,
        if_not_exists: bool,
        columns: Vec<ColumnDef>,
    },
    AddColumn {
        table: TableName,
        column: ColumnDef,
    },
    Insert {
        table: TableName,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Update {
        table: TableName,
        assignments: Vec<(String, Value)>,
        predicate: Option<Predicate>,
    },
    Delete {
        table: TableName,
        predicate: Option<Predicate>,
    },
    DropTable {
        table: TableName,
    },
    Truncate {
        table: TableName,
    },
}

impl Statement {
    /// The table this statement targets, for table-scoped error reporting.
    pub fn table(&self) -> &TableName {
        match self {
            Statement::CreateTable { table, .. }
            | Statement::AddColumn { table, .. }
            | Statement::Insert { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. }
            | Statement::DropTable { table }
            | Statement::Truncate { table } => table,
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Statement::CreateTable {
                table,
                if_not_exists,
                columns,
            } => {
                let defs: Vec<String> = columns.iter().map(|c| c.to_sql()).collect();
                format!(
                    "CREATE TABLE {}{} ({})",
                    if *if_not_exists { "IF NOT EXISTS " } else { "" },
                    quote_ident(table.as_str()),
                    defs.join(", ")
                )
            }
            Statement::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_ident(table.as_str()),
                column.to_sql()
            ),
            Statement::Insert {
                table,
                columns,
                rows,
            } => {
                let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                let tuples: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let rendered: Vec<String> = row.iter().map(render_value).collect();
                        format!("({})", rendered.join(", "))
                    })
                    .collect();
                format!(
                    "INSERT INTO {} ({}) VALUES {}",
                    quote_ident(table.as_str()),
                    cols.join(", "),
                    tuples.join(", ")
                )
            }
            Statement::Update {
                table,
                assignments,
                predicate,
            } => {
                let sets: Vec<String> = assignments
                    .iter()
                    .map(|(col, value)| format!("{} = {}", quote_ident(col), render_value(value)))
                    .collect();
                let mut sql = format!(
                    "UPDATE {} SET {}",
                    quote_ident(table.as_str()),
                    sets.join(", ")
                );
                if let Some(predicate) = predicate {
                    sql.push_str(" WHERE ");
                    sql.push_str(&predicate.to_sql());
                }
                sql
            }
            Statement::Delete { table, predicate } => {
                let mut sql = format!("DELETE FROM {}", quote_ident(table.as_str()));
                if let Some(predicate) = predicate {
                    sql.push_str(" WHERE ");
                    sql.push_str(&predicate.to_sql());
                }
                sql
            }
            Statement::DropTable { table } => format!("DROP TABLE {}", quote_ident(table.as_str())),
            Statement::Truncate { table } => format!("TRUNCATE TABLE {}", quote_ident(table.as_str())),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Text(s) => quote_literal(s),
        Value::Timestamp(ts) => quote_literal(&ts.format(TIMESTAMP_FORMAT).to_string()),
    }
}
