//! Batch orchestration: sequenced truncate-and-reload of every table.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::{EventSink, LoadEvent, TracingSink};
use crate::curated::CuratedStore;
use crate::error::{BatchError, LoadError, LoadErrorKind};
use crate::input::RawStore;
use crate::rules::RuleSet;
use crate::transform::{TransformEngine, TransformStats};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchState {
    NotStarted,
    Running { table: String },
    Completed,
    Failed { table: String },
    /// A stop was requested and honored at a table boundary.
    Stopped,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::NotStarted => f.write_str("not started"),
            BatchState::Running { table } => write!(f, "running ({})", table),
            BatchState::Completed => f.write_str("completed"),
            BatchState::Failed { table } => write!(f, "failed ({})", table),
            BatchState::Stopped => f.write_str("stopped"),
        }
    }
}

/// Outcome of one table load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Succeeded,
    Failed,
}

/// Per-table report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResult {
    /// Source table.
    pub table: String,
    /// Curated table written.
    pub target: String,
    pub status: LoadStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Raw rows read.
    pub raw_rows: usize,
    /// Curated rows written.
    pub rows_loaded: usize,
    pub null_key_rows: usize,
    pub duplicate_rows: usize,
    /// Fingerprint of the published content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Hash of the raw extract file, when read from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LoadError>,
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        self.status == LoadStatus::Succeeded
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    Failed,
    Stopped,
}

/// Aggregate report of one orchestrator invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub loads: Vec<LoadResult>,
}

impl BatchResult {
    /// Completed with every load successful.
    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Completed && self.loads.iter().all(LoadResult::is_success)
    }

    /// Report for one source table.
    pub fn load(&self, table: &str) -> Option<&LoadResult> {
        self.loads.iter().find(|l| l.table == table)
    }

    /// The failing load, if any.
    pub fn failure(&self) -> Option<&LoadResult> {
        self.loads.iter().find(|l| !l.is_success())
    }

    /// Curated rows written across all tables.
    pub fn rows_loaded(&self) -> usize {
        self.loads.iter().map(|l| l.rows_loaded).sum()
    }
}

/// Dry-run report for one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableCheck {
    pub table: String,
    pub target: String,
    pub stats: TransformStats,
}

/// What a successful table load produced.
struct Loaded {
    stats: TransformStats,
    fingerprint: String,
    source_hash: Option<String>,
}

/// Runs the full load: every rule set, in order, each as a truncate-and-replace unit.
///
/// The first failing table aborts the run. Tables loaded before it keep their
/// new content; the failing table is left either as it was or empty. Rerunning
/// is always safe because every load starts with a truncate.
pub struct BatchOrchestrator<R, C> {
    raw: R,
    curated: C,
    rule_sets: Vec<RuleSet>,
    engine: TransformEngine,
    sink: Box<dyn EventSink>,
    state: BatchState,
    stop: Arc<AtomicBool>,
}

impl<R: RawStore, C: CuratedStore> BatchOrchestrator<R, C> {
    /// Orchestrator logging its events through `tracing`.
    pub fn new(raw: R, curated: C, rule_sets: Vec<RuleSet>) -> Self {
        Self {
            raw,
            curated,
            rule_sets,
            engine: TransformEngine::new(),
            sink: Box::new(TracingSink),
            state: BatchState::NotStarted,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Share an externally owned stop flag.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that, once set, stops the run at the next table boundary.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Source tables in load order.
    pub fn tables(&self) -> Vec<&str> {
        self.rule_sets.iter().map(|r| r.source()).collect()
    }

    pub fn raw_store(&self) -> &R {
        &self.raw
    }

    pub fn raw_store_mut(&mut self) -> &mut R {
        &mut self.raw
    }

    pub fn curated_store(&self) -> &C {
        &self.curated
    }

    pub fn curated_store_mut(&mut self) -> &mut C {
        &mut self.curated
    }

    /// Run every table load in order.
    pub fn run_full_load(&mut self) -> Result<BatchResult, BatchError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let tables: Vec<String> = self.tables().iter().map(|t| t.to_string()).collect();
        let mut loads: Vec<LoadResult> = Vec::with_capacity(tables.len());

        self.sink.emit(&LoadEvent::BatchStarted {
            at: started_at,
            tables: tables.clone(),
        });

        for (i, rules) in self.rule_sets.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                self.state = BatchState::Stopped;
                self.sink.emit(&LoadEvent::BatchStopped {
                    completed: loads.len(),
                    remaining: tables[i..].to_vec(),
                });
                return Ok(BatchResult {
                    status: BatchStatus::Stopped,
                    started_at,
                    finished_at: Utc::now(),
                    duration_ms: elapsed_ms(clock),
                    loads,
                });
            }

            let table = rules.source().to_string();
            self.state = BatchState::Running {
                table: table.clone(),
            };
            let table_started = Utc::now();
            let table_clock = Instant::now();
            self.sink.emit(&LoadEvent::TableStarted {
                table: table.clone(),
                at: table_started,
            });

            let outcome = load_table(&self.raw, &mut self.curated, &self.engine, rules);
            let duration_ms = elapsed_ms(table_clock);
            let mut result = LoadResult {
                table: table.clone(),
                target: rules.schema().name.clone(),
                status: LoadStatus::Succeeded,
                started_at: table_started,
                finished_at: Utc::now(),
                duration_ms,
                raw_rows: 0,
                rows_loaded: 0,
                null_key_rows: 0,
                duplicate_rows: 0,
                fingerprint: None,
                source_hash: None,
                error: None,
            };

            match outcome {
                Ok(loaded) => {
                    result.raw_rows = loaded.stats.raw_rows;
                    result.rows_loaded = loaded.stats.output_rows;
                    result.null_key_rows = loaded.stats.null_key_rows;
                    result.duplicate_rows = loaded.stats.duplicate_rows;
                    result.fingerprint = Some(loaded.fingerprint);
                    result.source_hash = loaded.source_hash;
                    self.sink.emit(&LoadEvent::TableCompleted {
                        table,
                        rows: result.rows_loaded,
                        raw_rows: result.raw_rows,
                        duration_ms,
                    });
                    loads.push(result);
                }
                Err(error) => {
                    result.status = LoadStatus::Failed;
                    result.error = Some(error.clone());
                    self.sink.emit(&LoadEvent::TableFailed {
                        table: table.clone(),
                        kind: error.kind,
                        message: error.message.clone(),
                        duration_ms,
                    });
                    loads.push(result);

                    let duration_ms = elapsed_ms(clock);
                    self.sink.emit(&LoadEvent::BatchFailed {
                        table: table.clone(),
                        duration_ms,
                    });
                    self.state = BatchState::Failed { table };
                    return Err(BatchError {
                        error,
                        partial: BatchResult {
                            status: BatchStatus::Failed,
                            started_at,
                            finished_at: Utc::now(),
                            duration_ms,
                            loads,
                        },
                    });
                }
            }
        }

        let duration_ms = elapsed_ms(clock);
        self.sink.emit(&LoadEvent::BatchCompleted {
            tables: loads.len(),
            duration_ms,
        });
        self.state = BatchState::Completed;
        Ok(BatchResult {
            status: BatchStatus::Completed,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
            loads,
        })
    }

    /// Transform every table without touching the curated store.
    pub fn dry_run(&self) -> Result<Vec<TableCheck>, LoadError> {
        self.rule_sets
            .iter()
            .map(|rules| {
                let raw = self
                    .raw
                    .read(rules.source())
                    .map_err(|e| LoadError::new(rules.source(), LoadErrorKind::RawStore, &e))?;
                let outcome = self
                    .engine
                    .transform(rules, &raw)
                    .map_err(|e| LoadError::new(rules.source(), LoadErrorKind::Schema, &e))?;
                Ok(TableCheck {
                    table: rules.source().to_string(),
                    target: rules.schema().name.clone(),
                    stats: outcome.stats,
                })
            })
            .collect()
    }
}

/// Truncate, transform, publish. One table, one unit.
fn load_table<R: RawStore, C: CuratedStore>(
    raw: &R,
    curated: &mut C,
    engine: &TransformEngine,
    rules: &RuleSet,
) -> Result<Loaded, LoadError> {
    let table = rules.source();

    curated
        .truncate(rules.schema())
        .map_err(|e| LoadError::new(table, LoadErrorKind::Truncate, &e))?;

    let snapshot = raw
        .read(table)
        .map_err(|e| LoadError::new(table, LoadErrorKind::RawStore, &e))?;

    let outcome = engine
        .transform(rules, &snapshot)
        .map_err(|e| LoadError::new(table, LoadErrorKind::Schema, &e))?;

    curated
        .replace(&outcome.table)
        .map_err(|e| LoadError::new(table, LoadErrorKind::Write, &e))?;

    Ok(Loaded {
        stats: outcome.stats,
        fingerprint: outcome.table.to_snapshot().fingerprint(),
        source_hash: snapshot.source.map(|s| s.hash),
    })
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curated::MemoryCuratedStore;
    use crate::input::{MemoryRawStore, RawTable};
    use crate::orchestrator::RecordingSink;
    use crate::rules::{self, ERP_LOC_A101, ERP_PX_CAT_G1V2};

    fn raw_store() -> MemoryRawStore {
        MemoryRawStore::new()
            .with_table(RawTable::from_rows(
                ERP_LOC_A101,
                &["cid", "cntry"],
                &[&["AW-1", "DE"], &["AW-2", "USA"]],
            ))
            .with_table(RawTable::from_rows(
                ERP_PX_CAT_G1V2,
                &["id", "cat", "subcat", "maintenance"],
                &[&["AC_BR", "Accessories", "Bike Racks", "Yes"]],
            ))
    }

    fn orchestrator() -> BatchOrchestrator<MemoryRawStore, MemoryCuratedStore> {
        BatchOrchestrator::new(
            raw_store(),
            MemoryCuratedStore::new(),
            vec![rules::erp_loc_a101().unwrap(), rules::erp_px_cat_g1v2().unwrap()],
        )
    }

    #[test]
    fn test_full_load_success() {
        let mut orch = orchestrator();
        assert_eq!(orch.state(), &BatchState::NotStarted);

        let result = orch.run_full_load().unwrap();
        assert!(result.is_success());
        assert_eq!(result.loads.len(), 2);
        assert_eq!(result.rows_loaded(), 3);
        assert_eq!(orch.state(), &BatchState::Completed);
        assert!(result.load(ERP_LOC_A101).unwrap().fingerprint.is_some());
    }

    #[test]
    fn test_events_in_order() {
        let sink = Arc::new(RecordingSink::new());
        let mut orch = orchestrator().with_sink(Arc::clone(&sink));
        orch.run_full_load().unwrap();

        let events = sink.events();
        assert!(matches!(events.first(), Some(LoadEvent::BatchStarted { .. })));
        assert!(matches!(events.last(), Some(LoadEvent::BatchCompleted { tables: 2, .. })));
        let started: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                LoadEvent::TableStarted { table, .. } => Some(table.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![ERP_LOC_A101, ERP_PX_CAT_G1V2]);
    }

    #[test]
    fn test_missing_raw_table_aborts() {
        let mut orch = orchestrator();
        orch.raw_store_mut().remove(ERP_LOC_A101);

        let err = orch.run_full_load().unwrap_err();
        assert_eq!(err.error.table, ERP_LOC_A101);
        assert_eq!(err.error.kind, LoadErrorKind::RawStore);
        // The second table never ran.
        assert_eq!(err.partial.loads.len(), 1);
        assert_eq!(err.partial.status, BatchStatus::Failed);
        assert_eq!(
            orch.state(),
            &BatchState::Failed {
                table: ERP_LOC_A101.to_string()
            }
        );
    }

    #[test]
    fn test_stop_honored_before_first_table() {
        let mut orch = orchestrator();
        orch.stop_handle().store(true, Ordering::SeqCst);

        let result = orch.run_full_load().unwrap();
        assert_eq!(result.status, BatchStatus::Stopped);
        assert!(result.loads.is_empty());
        assert!(!result.is_success());
        assert_eq!(orch.state(), &BatchState::Stopped);
    }

    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let orch = orchestrator();
        let checks = orch.dry_run().unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].stats.output_rows, 2);
        assert!(orch.curated_store().table_names().is_empty());
    }
}
