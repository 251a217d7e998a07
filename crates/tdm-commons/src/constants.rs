//! System column names and shared formatting constants.
//!
//! Every dynamic table carries these injected columns. They are created by
//! the table store, never stored as user column descriptors, and excluded
//! from user-facing exports.

/// Generated unique key of a row.
pub const ROW_ID: &str = "row_id";

/// Who currently occupies the row; `NULL` means the row is available.
pub const OCCUPIED_BY: &str = "occupied_by";

/// When the row was occupied.
pub const OCCUPIED_DATE: &str = "occupied_date";

/// When the row was inserted.
pub const CREATED_WHEN: &str = "created_when";

/// UI selection marker.
pub const SELECTED: &str = "selected";

/// All system columns in creation order.
pub const SYSTEM_COLUMNS: [&str; 5] = [ROW_ID, OCCUPIED_BY, OCCUPIED_DATE, CREATED_WHEN, SELECTED];

/// Canonical textual format for every temporal value leaving the store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns true when `column` is one of the injected system columns.
pub fn is_system_column(column: &str) -> bool {
    SYSTEM_COLUMNS.contains(&column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_column_detection() {
        assert!(is_system_column(ROW_ID));
        assert!(is_system_column(OCCUPIED_BY));
        assert!(!is_system_column("customer_name"));
    }
}
