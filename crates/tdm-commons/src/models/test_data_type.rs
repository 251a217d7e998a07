//! Row partition by occupation state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Query-time partition of a table's rows.
///
/// This is never a stored flag: it is a predicate over the `occupied_by`
/// system column, so it cannot drift from row state. `Occupied` and
/// `Available` partition the table; `All` is their union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestDataType {
    All,
    Available,
    Occupied,
}

impl TestDataType {
    pub fn as_str(self) -> &'static str {
        match self {
            TestDataType::All => "ALL",
            TestDataType::Available => "AVAILABLE",
            TestDataType::Occupied => "OCCUPIED",
        }
    }
}

impl fmt::Display for TestDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestDataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALL" => Ok(TestDataType::All),
            "AVAILABLE" => Ok(TestDataType::Available),
            "OCCUPIED" => Ok(TestDataType::Occupied),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            TestDataType::from_str("available").unwrap(),
            TestDataType::Available
        );
        assert_eq!(TestDataType::from_str("ALL").unwrap(), TestDataType::All);
        assert!(TestDataType::from_str("unknown").is_err());
    }
}
