//! Medallion: bronze-to-silver transformation engine.
//!
//! Raw CRM and ERP extracts are cleansed, standardized, deduplicated and
//! published as curated tables. Every load is a full truncate-and-reload, so
//! rerunning the batch is always safe.
//!
//! # Core Principles
//!
//! - **Declarative rules**: each table is a [`RuleSet`] interpreted by one generic engine
//! - **Total rules**: bad values become null, a default or `n/a`; they never fail a load
//! - **Idempotent loads**: the same raw snapshot always yields the same curated table
//!
//! # Example
//!
//! ```no_run
//! use medallion::PipelineConfig;
//!
//! let config = PipelineConfig::from_file("medallion.toml").unwrap();
//! let mut orchestrator = config.orchestrator().unwrap();
//! let result = orchestrator.run_full_load().unwrap();
//!
//! for load in &result.loads {
//!     println!("{}: {} rows", load.target, load.rows_loaded);
//! }
//! ```

pub mod config;
pub mod curated;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod rules;
pub mod schema;
pub mod transform;

pub use config::PipelineConfig;
pub use curated::{CsvCuratedStore, CuratedStore, CuratedTable, MemoryCuratedStore};
pub use error::{BatchError, LoadError, LoadErrorKind, MedallionError, Result};
pub use input::{CsvRawStore, MemoryRawStore, RawStore, RawTable};
pub use orchestrator::{
    BatchOrchestrator, BatchResult, BatchState, BatchStatus, EventSink, LoadEvent, LoadResult,
    LoadStatus,
};
pub use rules::{RuleContext, RuleSet};
pub use schema::{ColumnSchema, ColumnType, Constraint, TableSchema, Value};
pub use transform::{TransformEngine, TransformStats};
