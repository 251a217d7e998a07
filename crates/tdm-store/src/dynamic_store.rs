//! The dynamic table store: physical-table lifecycle and CRUD.
//!
//! State machine per table: absent → created → (rows mutated) → dropped.
//! Every table begins with the injected system columns; user columns are
//! added on demand when inserted rows introduce unknown keys.

use crate::backend::SqlBackend;
use crate::error::{Result, StoreError};
use crate::extractor::{extract, TableReadResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tdm_commons::constants::{self, CREATED_WHEN, OCCUPIED_BY, OCCUPIED_DATE, ROW_ID};
use tdm_commons::{Row, RowId, RowIdGenerator, TableName, TestDataType, Value};
use tdm_sql::identifiers::validate_column_name;
use tdm_sql::query::data_type_predicate;
use tdm_sql::{
    build_select, condition, ColumnDef, ConditionKind, Filter, Page, Predicate, SortOrder,
    Statement,
};

/// Store owning the lifecycle of runtime-created tables.
///
/// Cloneable handle; all state lives in the backend.
#[derive(Clone)]
pub struct DynamicTableStore {
    backend: Arc<dyn SqlBackend>,
    row_ids: Arc<RowIdGenerator>,
    /// Default timeout applied to every statement; reads accept an override.
    statement_timeout: Option<Duration>,
}

impl DynamicTableStore {
    pub fn new(backend: Arc<dyn SqlBackend>) -> Self {
        Self {
            backend,
            row_ids: Arc::new(RowIdGenerator::default()),
            statement_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Replace the id generator, e.g. with one carrying the instance's
    /// worker id.
    pub fn with_row_ids(mut self, row_ids: Arc<RowIdGenerator>) -> Self {
        self.row_ids = row_ids;
        self
    }

    pub fn backend(&self) -> &Arc<dyn SqlBackend> {
        &self.backend
    }

    /// Idempotent DDL: create the table with the base system column set.
    pub async fn create_if_absent(&self, table: &TableName) -> Result<()> {
        let statement = Statement::CreateTable {
            table: table.clone(),
            if_not_exists: true,
            columns: tdm_sql::statements::system_column_defs(),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await?;
        Ok(())
    }

    /// Live column list from schema introspection.
    pub async fn live_columns(&self, table: &TableName) -> Result<Vec<String>> {
        self.backend.columns(table).await
    }

    pub async fn table_exists(&self, table: &TableName) -> Result<bool> {
        self.backend.table_exists(table).await
    }

    /// Add `column` unless the live schema already has it.
    ///
    /// Adding a column that appeared concurrently is tolerated by the
    /// backend (idempotent ADD COLUMN), so a repeated add never fails a
    /// batch.
    pub async fn ensure_column(&self, table: &TableName, column: &str) -> Result<()> {
        validate_column_name(column)?;
        let known = self.backend.columns(table).await?;
        if known.iter().any(|c| c == column) {
            return Ok(());
        }
        let statement = Statement::AddColumn {
            table: table.clone(),
            column: ColumnDef::text(column),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
            .map_err(|e| StoreError::ColumnAdd {
                table: table.clone(),
                column: column.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Insert a batch of rows, widening the schema first when rows
    /// introduce unknown keys.
    ///
    /// The column-add step and the insert form one schema-then-data unit:
    /// if any add fails the insert never runs, leaving the table fully
    /// migrated or not widened at all. `skip_schema_update` skips the
    /// widening for bulk-import paths that pre-provision columns. Incoming
    /// system-column keys are ignored; `row_id` and `created_when` are
    /// always generated here.
    pub async fn insert_rows(
        &self,
        table: &TableName,
        exists: bool,
        rows: &[Row],
        skip_schema_update: bool,
    ) -> Result<u64> {
        if rows.is_empty() {
            return Err(StoreError::NoDataToInsert(table.clone()));
        }
        if !exists {
            self.create_if_absent(table).await?;
        }

        // Union of user columns across the batch, first-seen order.
        let mut batch_columns: Vec<String> = Vec::new();
        for row in rows {
            for column in row.user_column_names() {
                if !batch_columns.iter().any(|c| c == column) {
                    batch_columns.push(column.to_string());
                }
            }
        }

        if !skip_schema_update {
            for column in &batch_columns {
                self.ensure_column(table, column).await?;
            }
        }

        let now = Utc::now();
        let mut insert_columns = vec![ROW_ID.to_string(), CREATED_WHEN.to_string()];
        insert_columns.extend(batch_columns.iter().cloned());

        let tuples: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                let mut values = Vec::with_capacity(insert_columns.len());
                values.push(Value::Text(self.row_ids.next_id().into_string()));
                values.push(Value::Timestamp(now));
                for column in &batch_columns {
                    values.push(row.get(column).cloned().unwrap_or(Value::Null));
                }
                values
            })
            .collect();

        let statement = Statement::Insert {
            table: table.clone(),
            columns: insert_columns,
            rows: tuples,
        };
        let inserted = self
            .backend
            .execute(&statement, self.statement_timeout)
            .await?;
        log::debug!("inserted {} rows into table {}", inserted, table);
        Ok(inserted)
    }

    /// Read rows through the query builder and row extractor.
    ///
    /// `timeout` overrides the store default for this one call; ad-hoc
    /// queries against arbitrary data need caller-controlled limits.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_rows(
        &self,
        table: &TableName,
        data_type: TestDataType,
        filters: &[Filter],
        order: Option<SortOrder>,
        page: Option<Page>,
        timeout: Option<Duration>,
    ) -> Result<TableReadResult> {
        let columns = self.backend.columns(table).await?;
        let query = build_select(table.clone(), columns, data_type, filters, order, page)?;
        extract(
            self.backend.as_ref(),
            &query,
            timeout.or(self.statement_timeout),
        )
        .await
    }

    /// True row count for one partition of the table.
    pub async fn count_rows(&self, table: &TableName, data_type: TestDataType) -> Result<u64> {
        let query = build_select(table.clone(), Vec::new(), data_type, &[], None, None)?;
        self.backend.count(&query, self.statement_timeout).await
    }

    /// Update all rows matching `filters`, returning the affected count.
    pub async fn update_rows(
        &self,
        table: &TableName,
        filters: &[Filter],
        assignments: Vec<(String, Value)>,
    ) -> Result<u64> {
        let statement = Statement::Update {
            table: table.clone(),
            assignments,
            predicate: Predicate::from_filters(filters)?,
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Delete all rows matching `filters`, returning the affected count.
    pub async fn delete_rows(&self, table: &TableName, filters: &[Filter]) -> Result<u64> {
        let statement = Statement::Delete {
            table: table.clone(),
            predicate: Predicate::from_filters(filters)?,
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Delete rows by id set.
    pub async fn delete_rows_by_ids(&self, table: &TableName, ids: &[RowId]) -> Result<u64> {
        let statement = Statement::Delete {
            table: table.clone(),
            predicate: Some(ids_predicate(ids)),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Delete rows of one partition whose `column` value is at or before
    /// `cutoff`. Passing [`TestDataType::Available`] spares occupied rows.
    pub async fn delete_rows_before(
        &self,
        table: &TableName,
        data_type: TestDataType,
        column: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64> {
        let rendered = cutoff.format(constants::TIMESTAMP_FORMAT).to_string();
        let before = condition(ConditionKind::To, true).predicate(column, &rendered);
        let statement = Statement::Delete {
            table: table.clone(),
            predicate: Predicate::and(data_type_predicate(data_type), Some(before)),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Delete every row of one partition.
    pub async fn delete_partition(&self, table: &TableName, data_type: TestDataType) -> Result<u64> {
        let statement = Statement::Delete {
            table: table.clone(),
            predicate: data_type_predicate(data_type),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Mark rows as occupied. The sole writer of `occupied_by` /
    /// `occupied_date` besides [`DynamicTableStore::release`] and cleanup.
    pub async fn occupy(
        &self,
        table: &TableName,
        occupied_by: &str,
        ids: &[RowId],
    ) -> Result<u64> {
        let statement = Statement::Update {
            table: table.clone(),
            assignments: vec![
                (OCCUPIED_BY.to_string(), Value::text(occupied_by)),
                (OCCUPIED_DATE.to_string(), Value::Timestamp(Utc::now())),
            ],
            predicate: Some(ids_predicate(ids)),
        };
        let affected = self
            .backend
            .execute(&statement, self.statement_timeout)
            .await?;
        log::info!(
            "occupied {} rows in table {} for '{}'",
            affected,
            table,
            occupied_by
        );
        Ok(affected)
    }

    /// Release previously occupied rows.
    pub async fn release(&self, table: &TableName, ids: &[RowId]) -> Result<u64> {
        let statement = Statement::Update {
            table: table.clone(),
            assignments: vec![
                (OCCUPIED_BY.to_string(), Value::Null),
                (OCCUPIED_DATE.to_string(), Value::Null),
            ],
            predicate: Some(ids_predicate(ids)),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Drop the table. Fails with [`StoreError::TableNotFound`] when absent.
    pub async fn drop_table(&self, table: &TableName) -> Result<()> {
        let statement = Statement::DropTable {
            table: table.clone(),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await?;
        Ok(())
    }

    /// Best-effort drop tolerating exactly `TableNotFound`.
    ///
    /// Any other failure still propagates; this wrapper must not mask
    /// genuine errors.
    pub async fn drop_table_if_exists(&self, table: &TableName) -> Result<()> {
        match self.drop_table(table).await {
            Ok(()) => Ok(()),
            Err(StoreError::TableNotFound(_)) => {
                log::debug!("table {} already gone, drop skipped", table);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove all rows, keeping the schema.
    pub async fn truncate_table(&self, table: &TableName) -> Result<u64> {
        let statement = Statement::Truncate {
            table: table.clone(),
        };
        self.backend
            .execute(&statement, self.statement_timeout)
            .await
    }

    /// Rows and columns for a user-facing export: system columns excluded.
    pub async fn export_rows(&self, table: &TableName) -> Result<(Vec<String>, Vec<Row>)> {
        let result = self
            .get_rows(table, TestDataType::All, &[], None, None, None)
            .await?;
        let columns: Vec<String> = result
            .columns
            .into_iter()
            .filter(|c| !constants::is_system_column(c))
            .collect();
        let rows: Vec<Row> = result
            .rows
            .into_iter()
            .map(|row| row.without_system_columns())
            .collect();
        Ok((columns, rows))
    }
}

fn ids_predicate(ids: &[RowId]) -> Predicate {
    Predicate::InIds {
        column: ROW_ID.to_string(),
        ids: ids.iter().map(|id| id.as_str().to_string()).collect(),
    }
}
