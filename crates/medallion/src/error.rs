//! Error types for the medallion library.
//!
//! Row-level data-quality problems never show up here: the rule sets absorb
//! them into the data. Everything in this module is operational and fatal to
//! the table load that raised it.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrator::BatchResult;

/// Main error type for medallion operations.
#[derive(Debug, Error)]
pub enum MedallionError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The raw store has no extract for a table.
    #[error("Missing source table: {0}")]
    MissingTable(String),

    /// Raw columns or rule coverage do not match the target schema.
    #[error("Schema mismatch for '{table}': {message}")]
    SchemaMismatch { table: String, message: String },

    /// A store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// Empty file or no data to read.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl MedallionError {
    /// Shorthand for a schema mismatch on `table`.
    pub fn schema_mismatch(table: impl Into<String>, message: impl Into<String>) -> Self {
        MedallionError::SchemaMismatch {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for medallion operations.
pub type Result<T> = std::result::Result<T, MedallionError>;

/// Stage of a table load at which an operational error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    /// Reading the raw extract failed.
    RawStore,
    /// Raw columns or rule set did not fit the target schema.
    Schema,
    /// Truncating the curated table failed.
    Truncate,
    /// Publishing the curated rows failed.
    Write,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadErrorKind::RawStore => "raw store",
            LoadErrorKind::Schema => "schema",
            LoadErrorKind::Truncate => "truncate",
            LoadErrorKind::Write => "write",
        };
        f.write_str(label)
    }
}

/// A failed table load: which table, at what stage, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("load of '{table}' failed ({kind}): {message}")]
pub struct LoadError {
    pub table: String,
    pub kind: LoadErrorKind,
    pub message: String,
}

impl LoadError {
    /// Wrap an underlying error with the table identity and stage.
    pub fn new(table: impl Into<String>, kind: LoadErrorKind, source: &MedallionError) -> Self {
        Self {
            table: table.into(),
            kind,
            message: source.to_string(),
        }
    }
}

/// Batch aborted: the first failing load plus everything that ran before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BatchError {
    /// The load that aborted the run.
    pub error: LoadError,
    /// Results recorded up to and including the failure.
    pub partial: BatchResult,
}
