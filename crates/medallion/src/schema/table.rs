//! Table-level schema definition.

use serde::{Deserialize, Serialize};

use super::types::{ColumnType, Constraint, Value};

/// One curated column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
    /// Value constraints checked on every published row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl ColumnSchema {
    /// Unconstrained column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Check a value against the declared type and constraints.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        if !self.column_type.accepts(value) {
            return Err(format!(
                "column '{}' expects {} but got '{}'",
                self.name, self.column_type, value
            ));
        }
        for constraint in &self.constraints {
            constraint
                .check(value)
                .map_err(|msg| format!("column '{}': {}", self.name, msg))?;
        }
        Ok(())
    }
}

/// Schema for an entire curated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Target table name, e.g. `silver.crm_cust_info`.
    pub name: String,
    /// Columns in publication order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table schema with the given columns.
    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema::with_columns(
            "silver.erp_cust_az12",
            vec![
                ColumnSchema::new("cid", ColumnType::Identifier),
                ColumnSchema::new("gen", ColumnType::Text)
                    .with_constraint(Constraint::vocabulary(&["Male", "Female", "n/a"])),
            ],
        )
    }

    #[test]
    fn test_lookup() {
        let s = schema();
        assert_eq!(s.position("gen"), Some(1));
        assert_eq!(s.column_names(), vec!["cid", "gen"]);
        assert!(s.get_column("bdate").is_none());
    }

    #[test]
    fn test_check_reports_column() {
        let s = schema();
        let err = s.columns[1].check(&Value::text("F")).unwrap_err();
        assert!(err.contains("gen"));
        assert!(s.columns[0].check(&Value::Integer(5)).is_ok());
    }
}
