//! Condition factory: the single place where filter-operator semantics live.
//!
//! Every filter operator in the system routes through [`condition`];
//! duplicating comparison logic elsewhere is a correctness hazard.

use crate::error::SqlError;
use crate::filters::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time-of-day suffix appended to a date-only FROM endpoint.
pub const DAY_START_SUFFIX: &str = " 00:00:00";

/// Time-of-day suffix appended to a date-only TO endpoint.
pub const DAY_END_SUFFIX: &str = " 23:59:59";

/// Length of a date-only operand (`YYYY-MM-DD`).
const DATE_ONLY_LEN: usize = 10;

/// Operator family used to build a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    Equals,
    Contains,
    StartsWith,
    /// Inclusive lower endpoint of a date range.
    From,
    /// Inclusive upper endpoint of a date range.
    To,
}

impl ConditionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionKind::Equals => "EQUALS",
            ConditionKind::Contains => "CONTAINS",
            ConditionKind::StartsWith => "STARTS_WITH",
            ConditionKind::From => "FROM",
            ConditionKind::To => "TO",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EQUALS" => Ok(ConditionKind::Equals),
            "CONTAINS" => Ok(ConditionKind::Contains),
            "STARTS_WITH" | "STARTSWITH" => Ok(ConditionKind::StartsWith),
            "FROM" => Ok(ConditionKind::From),
            "TO" => Ok(ConditionKind::To),
            _ => Err(()),
        }
    }
}

/// Parse a condition kind from unvalidated input, failing with a typed error.
pub fn parse_condition_kind(s: &str) -> Result<ConditionKind, SqlError> {
    ConditionKind::from_str(s).map_err(|_| SqlError::UnsupportedConditionKind(s.to_string()))
}

/// A comparison-predicate builder for one (kind, case-sensitivity) pair.
///
/// Stateless and pure: building a predicate never touches the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    kind: ConditionKind,
    case_sensitive: bool,
}

/// Obtain the comparison builder for a (kind, case-sensitivity) pair.
pub fn condition(kind: ConditionKind, case_sensitive: bool) -> Condition {
    Condition {
        kind,
        case_sensitive,
    }
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Build the predicate comparing `column` against `value`.
    ///
    /// FROM/TO endpoints given as a date-only string get the fixed
    /// time-of-day suffix so the range stays inclusive at both ends.
    pub fn predicate(&self, column: &str, value: &str) -> Predicate {
        let value = match self.kind {
            ConditionKind::From if value.len() == DATE_ONLY_LEN => {
                format!("{}{}", value, DAY_START_SUFFIX)
            }
            ConditionKind::To if value.len() == DATE_ONLY_LEN => {
                format!("{}{}", value, DAY_END_SUFFIX)
            }
            _ => value.to_string(),
        };
        Predicate::Compare {
            column: column.to_string(),
            kind: self.kind,
            value,
            case_sensitive: self.case_sensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            parse_condition_kind("contains").unwrap(),
            ConditionKind::Contains
        );
        assert_eq!(
            parse_condition_kind("STARTS_WITH").unwrap(),
            ConditionKind::StartsWith
        );
        assert_eq!(
            parse_condition_kind("between"),
            Err(SqlError::UnsupportedConditionKind("between".to_string()))
        );
    }

    #[test]
    fn test_date_endpoints_get_time_suffix() {
        let from = condition(ConditionKind::From, true).predicate("created_when", "2024-03-01");
        match from {
            Predicate::Compare { value, .. } => assert_eq!(value, "2024-03-01 00:00:00"),
            other => panic!("unexpected predicate: {:?}", other),
        }

        let to = condition(ConditionKind::To, true).predicate("created_when", "2024-03-31");
        match to {
            Predicate::Compare { value, .. } => assert_eq!(value, "2024-03-31 23:59:59"),
            other => panic!("unexpected predicate: {:?}", other),
        }
    }

    #[test]
    fn test_full_timestamp_endpoint_kept_as_is() {
        let from =
            condition(ConditionKind::From, true).predicate("created_when", "2024-03-01 12:00:00");
        match from {
            Predicate::Compare { value, .. } => assert_eq!(value, "2024-03-01 12:00:00"),
            other => panic!("unexpected predicate: {:?}", other),
        }
    }
}
