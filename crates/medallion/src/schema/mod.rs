//! Curated (silver) table schemas.

mod table;
mod types;

pub use table::{ColumnSchema, TableSchema};
pub use types::{ColumnType, Constraint, Value};
