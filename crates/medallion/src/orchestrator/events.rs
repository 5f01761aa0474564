//! Load events emitted by the orchestrator.
//!
//! Events are an observable side channel for monitoring. They carry no
//! information the [`BatchResult`](super::BatchResult) does not.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::LoadErrorKind;

/// One step of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LoadEvent {
    BatchStarted {
        at: DateTime<Utc>,
        tables: Vec<String>,
    },
    TableStarted {
        table: String,
        at: DateTime<Utc>,
    },
    TableCompleted {
        table: String,
        rows: usize,
        raw_rows: usize,
        duration_ms: u64,
    },
    TableFailed {
        table: String,
        kind: LoadErrorKind,
        message: String,
        duration_ms: u64,
    },
    BatchCompleted {
        tables: usize,
        duration_ms: u64,
    },
    BatchFailed {
        table: String,
        duration_ms: u64,
    },
    BatchStopped {
        completed: usize,
        remaining: Vec<String>,
    },
}

/// Receiver of load events.
pub trait EventSink {
    fn emit(&self, event: &LoadEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &LoadEvent) {
        (**self).emit(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LoadEvent) {
        match event {
            LoadEvent::BatchStarted { tables, .. } => {
                info!(tables = tables.len(), "full load started");
            }
            LoadEvent::TableStarted { table, .. } => {
                info!(table = %table, "loading table");
            }
            LoadEvent::TableCompleted {
                table,
                rows,
                raw_rows,
                duration_ms,
            } => {
                info!(table = %table, rows, raw_rows, duration_ms, "table loaded");
            }
            LoadEvent::TableFailed {
                table,
                kind,
                message,
                duration_ms,
            } => {
                error!(table = %table, kind = %kind, duration_ms, "table load failed: {}", message);
            }
            LoadEvent::BatchCompleted {
                tables,
                duration_ms,
            } => {
                info!(tables, duration_ms, "full load completed");
            }
            LoadEvent::BatchFailed { table, duration_ms } => {
                error!(table = %table, duration_ms, "full load aborted");
            }
            LoadEvent::BatchStopped {
                completed,
                remaining,
            } => {
                warn!(completed, remaining = remaining.len(), "full load stopped on request");
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LoadEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far.
    pub fn events(&self) -> Vec<LoadEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &LoadEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Sends every event to several sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &LoadEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_through_arc() {
        let sink = Arc::new(RecordingSink::new());
        let fanout = FanoutSink::new().with(Arc::clone(&sink)).with(TracingSink);

        fanout.emit(&LoadEvent::BatchCompleted {
            tables: 6,
            duration_ms: 12,
        });
        assert_eq!(
            sink.events(),
            vec![LoadEvent::BatchCompleted {
                tables: 6,
                duration_ms: 12
            }]
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(LoadEvent::TableFailed {
            table: "crm_prd_info".into(),
            kind: LoadErrorKind::Write,
            message: "disk full".into(),
            duration_ms: 3,
        })
        .unwrap();
        assert_eq!(json["event"], "table_failed");
        assert_eq!(json["kind"], "write");
    }
}
