//! Curated rows and tables.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::schema::{TableSchema, Value};

/// One cleansed row, aligned with its table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratedRecord {
    values: Vec<Value>,
}

impl CuratedRecord {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A full curated table produced by one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedTable {
    pub schema: TableSchema,
    pub rows: Vec<CuratedRecord>,
}

impl CuratedTable {
    pub fn new(schema: TableSchema, rows: Vec<CuratedRecord>) -> Self {
        Self { schema, rows }
    }

    /// Target table name.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.position(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// All values of the named column.
    pub fn column(&self, column: &str) -> Vec<&Value> {
        match self.schema.position(column) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Rendered form, as published by a store.
    pub fn to_snapshot(&self) -> CuratedSnapshot {
        CuratedSnapshot {
            headers: self.schema.column_names().iter().map(|s| s.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| r.values().iter().map(Value::render).collect())
                .collect(),
        }
    }
}

/// A curated table's published contents: header and rendered rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratedSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CuratedSnapshot {
    /// Header-only snapshot, the state right after a truncate.
    pub fn empty(schema: &TableSchema) -> Self {
        Self {
            headers: schema.column_names().iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// SHA-256 over the header and rows; equal contents give equal hashes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for line in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, field) in line.iter().enumerate() {
                if i > 0 {
                    hasher.update(b"\x1f");
                }
                hasher.update(field.as_bytes());
            }
            hasher.update(b"\x1e");
        }
        format!("sha256:{:x}", hasher.finalize())
    }
}
