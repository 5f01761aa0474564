//! Raw store boundary and its implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::parser::{Parser, ParserConfig};
use super::source::RawTable;
use crate::error::{MedallionError, Result};

/// Source of bronze-layer snapshots, one per source table.
pub trait RawStore {
    /// Read the current snapshot of `table`.
    fn read(&self, table: &str) -> Result<RawTable>;
}

/// Raw store backed by a directory of `<table>.csv` extracts.
pub struct CsvRawStore {
    root: PathBuf,
    parser: Parser,
}

impl CsvRawStore {
    /// Store reading from `root` with delimiter auto-detection.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ParserConfig::default())
    }

    /// Store reading from `root` with a custom parser configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: ParserConfig) -> Self {
        Self {
            root: root.into(),
            parser: Parser::with_config(config),
        }
    }

    /// Directory the extracts are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the extract for `table`.
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }
}

impl RawStore for CsvRawStore {
    fn read(&self, table: &str) -> Result<RawTable> {
        let path = self.path_for(table);
        if !path.exists() {
            return Err(MedallionError::MissingTable(format!(
                "{} (expected {})",
                table,
                path.display()
            )));
        }
        self.parser.parse_file(table, &path)
    }
}

/// In-memory raw store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryRawStore {
    tables: HashMap<String, RawTable>,
}

impl MemoryRawStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table snapshot.
    pub fn insert(&mut self, table: RawTable) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.insert(table);
        self
    }

    /// Drop a table snapshot so later reads fail.
    pub fn remove(&mut self, table: &str) -> Option<RawTable> {
        self.tables.remove(table)
    }
}

impl RawStore for MemoryRawStore {
    fn read(&self, table: &str) -> Result<RawTable> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| MedallionError::MissingTable(table.to_string()))
    }
}
