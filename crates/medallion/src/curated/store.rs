//! Curated store boundary and its implementations.
//!
//! A store publishes whole tables. Readers see either the previous content,
//! the empty table left by a truncate, or the complete new content; never a
//! partially written table.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::record::{CuratedSnapshot, CuratedTable};
use crate::error::{MedallionError, Result};
use crate::schema::TableSchema;

/// Destination for curated (silver) tables.
pub trait CuratedStore {
    /// Remove all rows of the table, leaving its header.
    fn truncate(&mut self, schema: &TableSchema) -> Result<()>;

    /// Publish the table's full contents, replacing whatever was there.
    fn replace(&mut self, table: &CuratedTable) -> Result<()>;

    /// Current published contents, if the table exists.
    fn snapshot(&self, table: &str) -> Result<Option<CuratedSnapshot>>;
}

/// Curated store writing one `<target>.csv` per table.
///
/// Each write goes to a temporary sibling file that is renamed over the
/// target, so a table is never visible half-written.
pub struct CsvCuratedStore {
    root: PathBuf,
}

impl CsvCuratedStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the curated tables live in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the curated file for `table`.
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }

    fn publish(&self, table: &str, snapshot: &CuratedSnapshot) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| MedallionError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        let path = self.path_for(table);
        let tmp = self.root.join(format!(".{}.csv.tmp", table));
        let published = write_snapshot(&tmp, snapshot).and_then(|()| {
            fs::rename(&tmp, &path).map_err(|e| MedallionError::Io { path, source: e })
        });
        if published.is_err() {
            // The target is untouched; only the partial temp file goes.
            let _ = fs::remove_file(&tmp);
        }
        published
    }
}

fn write_snapshot(tmp: &Path, snapshot: &CuratedSnapshot) -> Result<()> {
    let file = File::create(tmp).map_err(|e| MedallionError::Io {
        path: tmp.to_path_buf(),
        source: e,
    })?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    writer.write_record(&snapshot.headers)?;
    for row in &snapshot.rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| MedallionError::Io {
        path: tmp.to_path_buf(),
        source: e,
    })
}

impl CuratedStore for CsvCuratedStore {
    fn truncate(&mut self, schema: &TableSchema) -> Result<()> {
        self.publish(&schema.name, &CuratedSnapshot::empty(schema))
    }

    fn replace(&mut self, table: &CuratedTable) -> Result<()> {
        self.publish(table.name(), &table.to_snapshot())
    }

    fn snapshot(&self, table: &str) -> Result<Option<CuratedSnapshot>> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;
        let headers = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(|s| s.to_string()).collect());
        }
        Ok(Some(CuratedSnapshot { headers, rows }))
    }
}

/// In-memory curated store.
///
/// Failures can be injected per table to exercise the orchestrator's
/// isolation guarantees.
#[derive(Debug, Clone, Default)]
pub struct MemoryCuratedStore {
    tables: HashMap<String, CuratedSnapshot>,
    failing_truncates: HashSet<String>,
    failing_writes: HashSet<String>,
}

impl MemoryCuratedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every truncate of `table` fail.
    pub fn fail_truncate_for(&mut self, table: impl Into<String>) {
        self.failing_truncates.insert(table.into());
    }

    /// Make every replace of `table` fail (truncates still succeed).
    pub fn fail_writes_for(&mut self, table: impl Into<String>) {
        self.failing_writes.insert(table.into());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&mut self) {
        self.failing_truncates.clear();
        self.failing_writes.clear();
    }

    /// Names of all published tables, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl CuratedStore for MemoryCuratedStore {
    fn truncate(&mut self, schema: &TableSchema) -> Result<()> {
        if self.failing_truncates.contains(&schema.name) {
            return Err(MedallionError::Store(format!(
                "truncate of '{}' rejected",
                schema.name
            )));
        }
        self.tables
            .insert(schema.name.clone(), CuratedSnapshot::empty(schema));
        Ok(())
    }

    fn replace(&mut self, table: &CuratedTable) -> Result<()> {
        if self.failing_writes.contains(table.name()) {
            return Err(MedallionError::Store(format!(
                "write of '{}' rejected",
                table.name()
            )));
        }
        self.tables
            .insert(table.name().to_string(), table.to_snapshot());
        Ok(())
    }

    fn snapshot(&self, table: &str) -> Result<Option<CuratedSnapshot>> {
        Ok(self.tables.get(table).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curated::CuratedRecord;
    use crate::schema::{ColumnSchema, ColumnType, Value};
    use tempfile::TempDir;

    fn table(rows: &[&str]) -> CuratedTable {
        CuratedTable::new(
            TableSchema::with_columns(
                "silver.erp_loc_a101",
                vec![
                    ColumnSchema::new("cid", ColumnType::Identifier),
                    ColumnSchema::new("cntry", ColumnType::Text),
                ],
            ),
            rows.iter()
                .map(|cid| CuratedRecord::new(vec![Value::text(*cid), Value::text("Germany, DE")]))
                .collect(),
        )
    }

    #[test]
    fn test_csv_store_replace_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvCuratedStore::new(dir.path().join("silver"));
        let t = table(&["AW1", "AW2"]);

        store.replace(&t).unwrap();
        let snap = store.snapshot("silver.erp_loc_a101").unwrap().unwrap();
        assert_eq!(snap, t.to_snapshot());
        assert!(!dir.path().join("silver/.silver.erp_loc_a101.csv.tmp").exists());
    }

    #[test]
    fn test_csv_store_truncate_leaves_header() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvCuratedStore::new(dir.path());
        let t = table(&["AW1"]);
        store.replace(&t).unwrap();

        store.truncate(&t.schema).unwrap();
        let snap = store.snapshot("silver.erp_loc_a101").unwrap().unwrap();
        assert_eq!(snap.row_count(), 0);
        assert_eq!(snap.headers, vec!["cid", "cntry"]);
    }

    #[test]
    fn test_csv_store_failed_write_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvCuratedStore::new(dir.path());
        let t = table(&["AW1"]);
        store.replace(&t).unwrap();

        // A row narrower than the header makes the csv writer fail mid-file.
        let ragged = CuratedSnapshot {
            headers: vec!["cid".into(), "cntry".into()],
            rows: vec![vec!["AW2".into(), "Germany".into()], vec!["AW3".into()]],
        };
        assert!(store.publish("silver.erp_loc_a101", &ragged).is_err());

        assert!(!dir.path().join(".silver.erp_loc_a101.csv.tmp").exists());
        let snap = store.snapshot("silver.erp_loc_a101").unwrap().unwrap();
        assert_eq!(snap, t.to_snapshot());
    }

    #[test]
    fn test_csv_store_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvCuratedStore::new(dir.path());
        // A non-empty directory where the table file should go blocks the rename.
        let blocker = dir.path().join("silver.erp_loc_a101.csv");
        fs::create_dir_all(blocker.join("inner")).unwrap();

        assert!(store.replace(&table(&["AW1"])).is_err());
        assert!(!dir.path().join(".silver.erp_loc_a101.csv.tmp").exists());
    }

    #[test]
    fn test_csv_store_missing_table() {
        let dir = TempDir::new().unwrap();
        let store = CsvCuratedStore::new(dir.path());
        assert!(store.snapshot("silver.none").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_injected_write_failure() {
        let mut store = MemoryCuratedStore::new();
        let t = table(&["AW1"]);
        store.replace(&t).unwrap();
        store.fail_writes_for("silver.erp_loc_a101");

        store.truncate(&t.schema).unwrap();
        assert!(store.replace(&t).is_err());
        let snap = store.snapshot("silver.erp_loc_a101").unwrap().unwrap();
        assert_eq!(snap.row_count(), 0);

        store.clear_failures();
        store.replace(&t).unwrap();
        assert_eq!(store.table_names(), vec!["silver.erp_loc_a101"]);
    }
}
