//! Filters, sort order and the predicate tree.
//!
//! A [`Filter`] is what callers supply (column, operator kind, value list,
//! case sensitivity). Filters compile into a [`Predicate`] tree: values
//! inside one filter are OR-ed, filters across columns are AND-ed. The tree
//! renders to SQL for real databases and is interpreted structurally by the
//! in-memory backend.

use crate::conditions::{condition, parse_condition_kind, ConditionKind};
use crate::error::SqlError;
use crate::identifiers::{quote_ident, quote_literal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One user-supplied filter over a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub kind: ConditionKind,
    pub values: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        kind: ConditionKind,
        values: Vec<String>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            column: column.into(),
            kind,
            values,
            case_sensitive,
        }
    }

    /// Convenience constructor taking the operator as a string, failing on
    /// unknown kinds.
    pub fn parse(
        column: impl Into<String>,
        kind: &str,
        values: Vec<String>,
        case_sensitive: bool,
    ) -> Result<Self, SqlError> {
        Ok(Self::new(
            column,
            parse_condition_kind(kind)?,
            values,
            case_sensitive,
        ))
    }
}

/// Sort direction for the single optional order column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" | "ASCENDING" => Ok(SortDirection::Asc),
            "DESC" | "DESCENDING" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Single-column sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub column: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Structured predicate over one table's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// All children must match.
    And(Vec<Predicate>),
    /// Any child must match.
    Or(Vec<Predicate>),
    /// One comparison built by the condition factory.
    Compare {
        column: String,
        kind: ConditionKind,
        value: String,
        case_sensitive: bool,
    },
    /// `column IS NULL`
    IsNull { column: String },
    /// `column IS NOT NULL`
    IsNotNull { column: String },
    /// `column IN ('id', ...)` over the row-id column.
    InIds { column: String, ids: Vec<String> },
}

impl Predicate {
    /// AND-combine two optional predicates.
    pub fn and(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
        match (left, right) {
            (Some(l), Some(r)) => Some(Predicate::And(vec![l, r])),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Compile user filters into a predicate tree.
    ///
    /// Values inside one filter are OR-ed; filters are AND-ed. A filter with
    /// an empty value list is rejected: it cannot express anything and a
    /// silent no-op would hide caller bugs.
    pub fn from_filters(filters: &[Filter]) -> Result<Option<Predicate>, SqlError> {
        let mut conjuncts = Vec::with_capacity(filters.len());
        for filter in filters {
            if filter.values.is_empty() {
                return Err(SqlError::InvalidFilter {
                    column: filter.column.clone(),
                    reason: "filter has no values".to_string(),
                });
            }
            let cond = condition(filter.kind, filter.case_sensitive);
            let mut disjuncts: Vec<Predicate> = filter
                .values
                .iter()
                .map(|v| cond.predicate(&filter.column, v))
                .collect();
            conjuncts.push(if disjuncts.len() == 1 {
                disjuncts.pop().unwrap()
            } else {
                Predicate::Or(disjuncts)
            });
        }
        Ok(match conjuncts.len() {
            0 => None,
            1 => conjuncts.pop(),
            _ => Some(Predicate::And(conjuncts)),
        })
    }

    /// Render this predicate as a SQL expression.
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::And(children) => Self::join_children(children, " AND "),
            Predicate::Or(children) => Self::join_children(children, " OR "),
            Predicate::Compare {
                column,
                kind,
                value,
                case_sensitive,
            } => Self::compare_sql(column, *kind, value, *case_sensitive),
            Predicate::IsNull { column } => format!("{} IS NULL", quote_ident(column)),
            Predicate::IsNotNull { column } => format!("{} IS NOT NULL", quote_ident(column)),
            Predicate::InIds { column, ids } => {
                let list: Vec<String> = ids.iter().map(|id| quote_literal(id)).collect();
                format!("{} IN ({})", quote_ident(column), list.join(", "))
            }
        }
    }

    fn join_children(children: &[Predicate], separator: &str) -> String {
        let parts: Vec<String> = children.iter().map(|c| format!("({})", c.to_sql())).collect();
        parts.join(separator)
    }

    fn compare_sql(column: &str, kind: ConditionKind, value: &str, case_sensitive: bool) -> String {
        let ident = quote_ident(column);
        match kind {
            ConditionKind::Equals => format!("{} = {}", ident, quote_literal(value)),
            ConditionKind::From => format!("{} >= {}", ident, quote_literal(value)),
            ConditionKind::To => format!("{} <= {}", ident, quote_literal(value)),
            ConditionKind::Contains => {
                Self::like_sql(&ident, &format!("%{}%", value), case_sensitive)
            }
            ConditionKind::StartsWith => {
                Self::like_sql(&ident, &format!("{}%", value), case_sensitive)
            }
        }
    }

    // Case-insensitive matching folds both operands at SQL level.
    fn like_sql(ident: &str, pattern: &str, case_sensitive: bool) -> String {
        if case_sensitive {
            format!("{} LIKE {}", ident, quote_literal(pattern))
        } else {
            format!("LOWER({}) LIKE LOWER({})", ident, quote_literal(pattern))
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
