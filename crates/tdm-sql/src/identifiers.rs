//! Identifier quoting and literal escaping.
//!
//! Dynamic tables carry user-provided column names, so identifiers are
//! always double-quoted to survive reserved words and mixed case, and
//! literals always have embedded quotes doubled before they reach a
//! predicate.

use crate::error::SqlError;

/// Quote an identifier for safe interpolation into SQL.
///
/// Embedded `"` characters are doubled per the SQL standard.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape a literal value: every `'` is doubled.
///
/// This is the project's only SQL-injection defense for filter values;
/// every literal placed into generated SQL must pass through here.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a string literal, escaped and single-quoted.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

/// Validate a user-supplied column name before it participates in DDL.
///
/// Column names are looser than table names (mixed case and spaces survive
/// quoting), but control characters and embedded quotes are rejected
/// outright rather than escaped into DDL.
pub fn validate_column_name(name: &str) -> Result<(), SqlError> {
    if name.is_empty() || name.len() > 128 {
        return Err(SqlError::UnsafeIdentifier(name.to_string()));
    }
    if name.chars().any(|c| c.is_control() || c == '"' || c == '\'') {
        return Err(SqlError::UnsafeIdentifier(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("name"), "\"name\"");
        assert_eq!(quote_ident("Select"), "\"Select\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_escape_literal_doubles_quotes() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("it''s"), "'it''''s'");
    }

    #[test]
    fn test_validate_column_name() {
        assert!(validate_column_name("Customer Name").is_ok());
        assert!(validate_column_name("").is_err());
        assert!(validate_column_name("bad\"col").is_err());
        assert!(validate_column_name("bad\ncol").is_err());
    }
}
