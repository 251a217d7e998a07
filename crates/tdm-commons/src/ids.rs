//! Typed identifiers for the TDM backend.
//!
//! All ids are string newtypes so that a project id can never be passed where
//! an environment id is expected. `TableName` additionally validates that the
//! wrapped string is a safe SQL identifier, since dynamic table names end up
//! inside generated DDL/DML.
//!
//! `RowIdGenerator` produces time-ordered unique row ids
//! (41-bit millisecond timestamp + worker id + sequence, snowflake layout).

use crate::errors::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of an owning project.
    ProjectId
);

string_id!(
    /// Identifier of an environment within a project.
    EnvironmentId
);

string_id!(
    /// Identifier of a system under an environment.
    SystemId
);

string_id!(
    /// Generated unique key of a single row in a dynamic table.
    RowId
);

/// Name of a runtime-created physical table.
///
/// Unlike the other ids this one is validated: it is interpolated (quoted)
/// into generated SQL, so only `[a-z0-9_]` starting with a letter is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Create a table name, panicking on invalid input.
    ///
    /// Use [`TableName::try_new`] for unvalidated external input.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::try_new(&value).unwrap_or_else(|e| panic!("invalid table name '{}': {}", value, e))
    }

    /// Create a table name, validating the identifier.
    pub fn try_new(value: &str) -> Result<Self, CommonError> {
        if value.is_empty() {
            return Err(CommonError::invalid_input("table name is empty"));
        }
        let mut chars = value.chars();
        let first = chars.next().unwrap();
        if !first.is_ascii_lowercase() {
            return Err(CommonError::invalid_input(
                "table name must start with a lowercase letter",
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(CommonError::invalid_input(
                "table name may only contain [a-z0-9_]",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generator for time-ordered unique row ids.
///
/// Layout (64 bits): 41-bit millisecond timestamp since the custom epoch,
/// 10-bit worker id, 12-bit sequence. Ids are rendered as decimal strings
/// because dynamic table values are textual.
pub struct RowIdGenerator {
    worker_id: u16,
    epoch: u64,
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_timestamp: u64,
    sequence: u16,
}

impl RowIdGenerator {
    /// Custom epoch: 2024-01-01 00:00:00 UTC
    pub const DEFAULT_EPOCH: u64 = 1_704_067_200_000;

    /// Maximum worker id (10 bits)
    pub const MAX_WORKER_ID: u16 = 1023;

    const MAX_SEQUENCE: u16 = 4095;

    pub fn new(worker_id: u16) -> Self {
        assert!(
            worker_id <= Self::MAX_WORKER_ID,
            "worker_id must be <= {}",
            Self::MAX_WORKER_ID
        );
        Self {
            worker_id,
            epoch: Self::DEFAULT_EPOCH,
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Generate the next unique row id.
    pub fn next_id(&self) -> RowId {
        let mut state = self.state.lock().expect("row id generator lock poisoned");
        let mut now = Self::current_millis().saturating_sub(self.epoch);

        if now == state.last_timestamp {
            state.sequence = state.sequence.wrapping_add(1) & Self::MAX_SEQUENCE;
            if state.sequence == 0 {
                // Sequence exhausted within this millisecond, spin to the next one
                while now <= state.last_timestamp {
                    now = Self::current_millis().saturating_sub(self.epoch);
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        let id = (now << 22) | ((self.worker_id as u64) << 12) | state.sequence as u64;
        RowId::new(id.to_string())
    }

    fn current_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_millis() as u64
    }
}

impl Default for RowIdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_validation() {
        assert!(TableName::try_new("tdm_orders_a1").is_ok());
        assert!(TableName::try_new("").is_err());
        assert!(TableName::try_new("1orders").is_err());
        assert!(TableName::try_new("orders; drop").is_err());
        assert!(TableName::try_new("Orders").is_err());
    }

    #[test]
    fn test_string_id_roundtrip() {
        let id = ProjectId::new("project-1");
        assert_eq!(id.as_str(), "project-1");
        assert_eq!(id.to_string(), "project-1");
    }

    #[test]
    fn test_row_ids_unique_and_ordered() {
        let generator = RowIdGenerator::new(1);
        let mut ids: Vec<u64> = (0..1000)
            .map(|_| generator.next_id().as_str().parse().unwrap())
            .collect();
        let sorted = ids.clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1000);
        assert_eq!(ids, sorted);
    }
}
