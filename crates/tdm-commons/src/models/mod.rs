//! Generic data model for dynamic tables.

pub mod row;
pub mod test_data_type;
pub mod value;

pub use row::Row;
pub use test_data_type::TestDataType;
pub use value::Value;
