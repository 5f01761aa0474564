//! Declarative per-table rule sets.
//!
//! A [`RuleSet`] pairs one source table with one curated schema. Each target
//! column is produced by exactly one [`ColumnRule`]; an optional
//! [`RowPolicy`] selects which raw rows survive before any column rule runs.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{MedallionError, Result};
use crate::input::{RawTable, SourceRecord};
use crate::schema::{ColumnSchema, ColumnType, TableSchema, Value};

/// Pure function from one raw row to one value. Must not panic.
pub type RowFn = Box<dyn Fn(&SourceRecord<'_>) -> Value + Send + Sync>;

/// How one target column is produced.
pub enum ColumnRule {
    /// Computed from the raw row alone.
    Row(RowFn),
    /// End of a validity range: the day before the next row's start within
    /// the same partition, ordered by start. The last row stays open (null).
    ///
    /// Both referenced columns are target columns produced by row rules.
    DerivedEnd {
        partition_by: String,
        order_by: String,
    },
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRule::Row(_) => f.write_str("Row(..)"),
            ColumnRule::DerivedEnd {
                partition_by,
                order_by,
            } => f
                .debug_struct("DerivedEnd")
                .field("partition_by", partition_by)
                .field("order_by", order_by)
                .finish(),
        }
    }
}

/// Row selection applied before column rules.
pub enum RowPolicy {
    /// Every raw row produces one curated row.
    KeepAll,
    /// One row per natural key: the greatest by `order_by`, later raw rows
    /// winning ties. Rows whose key is null are dropped.
    LatestPerKey {
        /// Raw column the key is read from, for reporting.
        key_column: String,
        /// Raw column the ordering is read from, for reporting.
        order_column: String,
        key: RowFn,
        order_by: RowFn,
    },
}

impl fmt::Debug for RowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPolicy::KeepAll => f.write_str("KeepAll"),
            RowPolicy::LatestPerKey {
                key_column,
                order_column,
                ..
            } => f
                .debug_struct("LatestPerKey")
                .field("key_column", key_column)
                .field("order_column", order_column)
                .finish(),
        }
    }
}

/// Serializable description of a rule set, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSetSummary {
    pub source: String,
    pub target: String,
    pub row_policy: String,
    pub required_columns: Vec<String>,
    pub columns: Vec<ColumnSummary>,
}

/// One target column in a [`RuleSetSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub column_type: ColumnType,
    pub rule: String,
}

/// The complete transformation of one source table.
#[derive(Debug)]
pub struct RuleSet {
    source: String,
    schema: TableSchema,
    required_columns: Vec<String>,
    rules: IndexMap<String, ColumnRule>,
    policy: RowPolicy,
}

impl RuleSet {
    /// Start building the rule set for `source`, publishing to `target`.
    pub fn builder(source: impl Into<String>, target: impl Into<String>) -> RuleSetBuilder {
        RuleSetBuilder {
            source: source.into(),
            target: target.into(),
            required_columns: Vec::new(),
            columns: Vec::new(),
            rules: IndexMap::new(),
            policy: RowPolicy::KeepAll,
            duplicates: Vec::new(),
        }
    }

    /// Source table name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Curated schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Raw columns the rules read.
    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    /// Rules in target column order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &ColumnRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Row selection policy.
    pub fn policy(&self) -> &RowPolicy {
        &self.policy
    }

    /// Check that every schema column has exactly one producing rule and
    /// that derived columns reference row-rule columns.
    pub fn validate(&self) -> Result<()> {
        let names = self.schema.column_names();
        if names.len() != self.rules.len() {
            return Err(self.mismatch(format!(
                "{} columns but {} rules",
                names.len(),
                self.rules.len()
            )));
        }
        for (name, (rule_name, rule)) in names.iter().zip(self.rules.iter()) {
            if *name != rule_name.as_str() {
                return Err(self.mismatch(format!(
                    "column '{}' has no producing rule (found rule for '{}')",
                    name, rule_name
                )));
            }
            if let ColumnRule::DerivedEnd {
                partition_by,
                order_by,
            } = rule
            {
                for referenced in [partition_by, order_by] {
                    match self.rules.get(referenced) {
                        Some(ColumnRule::Row(_)) => {}
                        _ => {
                            return Err(self.mismatch(format!(
                                "derived column '{}' references '{}', which is not a row-rule column",
                                name, referenced
                            )));
                        }
                    }
                }
                let order_type = self.schema.get_column(order_by).map(|c| c.column_type);
                let own_type = self.schema.get_column(name).map(|c| c.column_type);
                if order_type != Some(ColumnType::Date) || own_type != Some(ColumnType::Date) {
                    return Err(self.mismatch(format!(
                        "derived column '{}' and its ordering column '{}' must be dates",
                        name, order_by
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check the raw snapshot carries every column the rules read.
    pub fn validate_source(&self, raw: &RawTable) -> Result<()> {
        let required: Vec<&str> = self.required_columns.iter().map(|s| s.as_str()).collect();
        let missing = raw.missing_columns(&required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MedallionError::schema_mismatch(
                &self.source,
                format!("raw extract is missing column(s): {}", missing.join(", ")),
            ))
        }
    }

    /// Listing-friendly description.
    pub fn summary(&self) -> RuleSetSummary {
        let row_policy = match &self.policy {
            RowPolicy::KeepAll => "keep all rows".to_string(),
            RowPolicy::LatestPerKey {
                key_column,
                order_column,
                ..
            } => format!(
                "latest per '{}' by '{}', null keys dropped",
                key_column, order_column
            ),
        };
        let columns = self
            .schema
            .columns
            .iter()
            .map(|c| ColumnSummary {
                name: c.name.clone(),
                column_type: c.column_type,
                rule: match self.rules.get(&c.name) {
                    Some(ColumnRule::Row(_)) => "row".to_string(),
                    Some(ColumnRule::DerivedEnd {
                        partition_by,
                        order_by,
                    }) => format!("next '{}' per '{}' minus one day", order_by, partition_by),
                    None => "missing".to_string(),
                },
            })
            .collect();

        RuleSetSummary {
            source: self.source.clone(),
            target: self.schema.name.clone(),
            row_policy,
            required_columns: self.required_columns.clone(),
            columns,
        }
    }

    fn mismatch(&self, message: String) -> MedallionError {
        MedallionError::schema_mismatch(&self.source, message)
    }
}

/// Builder for [`RuleSet`]; each column is declared together with its rule.
pub struct RuleSetBuilder {
    source: String,
    target: String,
    required_columns: Vec<String>,
    columns: Vec<ColumnSchema>,
    rules: IndexMap<String, ColumnRule>,
    policy: RowPolicy,
    duplicates: Vec<String>,
}

impl RuleSetBuilder {
    /// Declare raw columns the rules read.
    pub fn requires(mut self, columns: &[&str]) -> Self {
        self.required_columns
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Add an unconstrained column computed from the raw row.
    pub fn column<F>(self, name: &str, column_type: ColumnType, rule: F) -> Self
    where
        F: Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static,
    {
        self.column_with(ColumnSchema::new(name, column_type), rule)
    }

    /// Add a column with an explicit schema (constraints included).
    pub fn column_with<F>(mut self, column: ColumnSchema, rule: F) -> Self
    where
        F: Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static,
    {
        self.push(column, ColumnRule::Row(Box::new(rule)));
        self
    }

    /// Add a date column closing each range the day before the next one opens.
    pub fn derived_end(mut self, name: &str, partition_by: &str, order_by: &str) -> Self {
        self.push(
            ColumnSchema::new(name, ColumnType::Date),
            ColumnRule::DerivedEnd {
                partition_by: partition_by.to_string(),
                order_by: order_by.to_string(),
            },
        );
        self
    }

    /// Keep only the latest row per natural key.
    pub fn latest_per_key<K, O>(
        mut self,
        key_column: &str,
        key: K,
        order_column: &str,
        order_by: O,
    ) -> Self
    where
        K: Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static,
        O: Fn(&SourceRecord<'_>) -> Value + Send + Sync + 'static,
    {
        self.policy = RowPolicy::LatestPerKey {
            key_column: key_column.to_string(),
            order_column: order_column.to_string(),
            key: Box::new(key),
            order_by: Box::new(order_by),
        };
        self
    }

    /// Finish and validate.
    pub fn build(self) -> Result<RuleSet> {
        if let Some(dup) = self.duplicates.first() {
            return Err(MedallionError::schema_mismatch(
                &self.source,
                format!("column '{}' has more than one producing rule", dup),
            ));
        }
        let rule_set = RuleSet {
            source: self.source,
            schema: TableSchema::with_columns(self.target, self.columns),
            required_columns: self.required_columns,
            rules: self.rules,
            policy: self.policy,
        };
        rule_set.validate()?;
        Ok(rule_set)
    }

    fn push(&mut self, column: ColumnSchema, rule: ColumnRule) {
        if self.rules.contains_key(&column.name) {
            self.duplicates.push(column.name);
            return;
        }
        self.rules.insert(column.name.clone(), rule);
        self.columns.push(column);
    }
}
