//! The query builder: SELECT plus its mandatory COUNT(*) twin.

use crate::error::SqlError;
use crate::filters::{Filter, Predicate, SortOrder};
use crate::identifiers::quote_ident;
use serde::{Deserialize, Serialize};
use tdm_commons::constants::OCCUPIED_BY;
use tdm_commons::{TableName, TestDataType};

/// Offset/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// A fully-built read query against one dynamic table.
///
/// The count twin shares every predicate with the data query but drops
/// order/offset/limit: pagination responses must report the true total,
/// not the number of rows returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    table: TableName,
    columns: Vec<String>,
    predicate: Option<Predicate>,
    order: Option<SortOrder>,
    page: Option<Page>,
}

/// Build the data query and its count twin for one table read.
///
/// `columns` is the live column list from schema introspection (physical
/// columns may lag descriptor metadata). `data_type` adds the fixed
/// `occupied_by` predicate for the Available/Occupied partitions; All adds
/// nothing. A zero-column table yields a query selecting no columns, which
/// is not itself an error — the row extractor handles the empty case.
pub fn build_select(
    table: TableName,
    columns: Vec<String>,
    data_type: TestDataType,
    filters: &[Filter],
    order: Option<SortOrder>,
    page: Option<Page>,
) -> Result<SelectQuery, SqlError> {
    let filter_predicate = Predicate::from_filters(filters)?;
    let predicate = Predicate::and(data_type_predicate(data_type), filter_predicate);
    Ok(SelectQuery {
        table,
        columns,
        predicate,
        order,
        page,
    })
}

/// The fixed partition predicate for a test data type.
pub fn data_type_predicate(data_type: TestDataType) -> Option<Predicate> {
    match data_type {
        TestDataType::All => None,
        TestDataType::Available => Some(Predicate::IsNull {
            column: OCCUPIED_BY.to_string(),
        }),
        TestDataType::Occupied => Some(Predicate::IsNotNull {
            column: OCCUPIED_BY.to_string(),
        }),
    }
}

impl SelectQuery {
    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn order(&self) -> Option<&SortOrder> {
        self.order.as_ref()
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    /// Render the data query.
    pub fn to_sql(&self) -> String {
        let select_list: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list.join(", "),
            quote_ident(self.table.as_str())
        );
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.to_sql());
        }
        if let Some(order) = &self.order {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                quote_ident(&order.column),
                order.direction.as_str()
            ));
        }
        if let Some(page) = self.page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
        }
        sql
    }

    /// Render the COUNT(*) twin: same predicates, no order/offset/limit.
    pub fn to_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(self.table.as_str()));
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.to_sql());
        }
        sql
    }
}
