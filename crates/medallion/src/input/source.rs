//! Raw extract tables and the weakly-typed records they hold.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata about the extract file a raw table was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the extract was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// One source table's current snapshot, as held by the raw store.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Source table name, e.g. `crm_cust_info`.
    pub name: String,
    /// Column headers in extract order.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// Where the snapshot came from, when it was read from a file.
    pub source: Option<SourceMetadata>,
    index: IndexMap<String, usize>,
}

impl RawTable {
    /// Create a raw table. Rows shorter than the header are padded with nulls.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
            source: None,
            index,
        }
    }

    /// Build a table from string slices; convenient for fixtures.
    pub fn from_rows(name: impl Into<String>, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    /// Attach file metadata.
    pub fn with_source(mut self, source: SourceMetadata) -> Self {
        self.source = Some(source);
        self
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Columns from `required` that this table lacks.
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.index.contains_key(*c))
            .collect()
    }

    /// View a single row.
    pub fn record(&self, row: usize) -> Option<SourceRecord<'_>> {
        self.rows.get(row).map(|values| SourceRecord {
            index: &self.index,
            values,
        })
    }

    /// Iterate all rows as records.
    pub fn records(&self) -> impl Iterator<Item = SourceRecord<'_>> {
        self.rows.iter().map(move |values| SourceRecord {
            index: &self.index,
            values,
        })
    }
}

/// A borrowed, read-only view of one raw row.
///
/// Fields are looked up by column name. An empty field is null, matching how
/// a bulk file load treats missing values.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecord<'a> {
    index: &'a IndexMap<String, usize>,
    values: &'a [String],
}

impl<'a> SourceRecord<'a> {
    /// Raw field value, untouched. `None` when the column is absent or the field is empty.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.index.get(column)?;
        let values: &'a [String] = self.values;
        values
            .get(idx)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Field parsed as an integer.
    ///
    /// Accepts surrounding whitespace and whole-valued decimals (`"12.0"`).
    /// Anything else is null.
    pub fn int(&self, column: &str) -> Option<i64> {
        let raw = self.get(column)?.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Some(n);
        }
        let f = raw.parse::<f64>().ok()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }
}
